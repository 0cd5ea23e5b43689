#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::fn_params_excessive_bools,
    clippy::doc_markdown
)]

pub mod app;
pub mod cli;
pub mod gh;
pub mod input;
pub mod resolver;
pub mod summary;
pub mod telemetry;
pub mod traits;
