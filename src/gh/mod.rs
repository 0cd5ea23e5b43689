pub mod executor;
pub mod parser;
pub mod service;

pub use service::GhCheckService;
