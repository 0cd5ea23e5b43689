use color_eyre::eyre::{eyre, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Confirm,
    Cancel,
    None,
}

/// Captures the resolver state needed to interpret a key press.
#[derive(Debug, Clone, Default)]
pub struct InputContext {
    pub can_confirm: bool,
}

pub fn map_key(key: KeyEvent, ctx: &InputContext) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    // Ctrl+C always cancels
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Cancel;
    }

    match key.code {
        KeyCode::Char('y' | 'Y') | KeyCode::Enter if ctx.can_confirm => Action::Confirm,
        KeyCode::Char('n' | 'N' | 'q') | KeyCode::Esc => Action::Cancel,
        _ => Action::None,
    }
}

/// Blocks until the user confirms or cancels. Runs with the terminal in raw
/// mode, restored before returning.
pub fn read_decision(ctx: &InputContext) -> Result<Action> {
    terminal::enable_raw_mode()?;
    let decision = wait_for_decision(ctx);
    terminal::disable_raw_mode()?;
    decision
}

fn wait_for_decision(ctx: &InputContext) -> Result<Action> {
    loop {
        match event::read() {
            Ok(Event::Key(key)) => match map_key(key, ctx) {
                Action::None => {}
                action => return Ok(action),
            },
            Ok(_) => {} // Non-key events (mouse, resize, etc.)
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(eyre!("Terminal read error: {e}")),
        }
    }
}
