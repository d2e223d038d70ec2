//! Hidden password input on the terminal.

use std::{error::Error, io::Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, ClearType},
};

type PromptResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

const MAX_ATTEMPTS: usize = 3;

/// Keeps the terminal in raw mode for as long as it lives.
struct RawMode;

impl RawMode {
    fn enable() -> PromptResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Pending,
    Done,
    Aborted,
}

/// Applies one key press to the secret typed so far.
fn handle_key(secret: &mut String, key: KeyEvent) -> Input {
    if key.kind == KeyEventKind::Release {
        return Input::Pending;
    }
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Input::Done,
        KeyCode::Esc => Input::Aborted,
        KeyCode::Char('c' | 'd') if control => Input::Aborted,
        KeyCode::Char('u') if control => {
            secret.clear();
            Input::Pending
        }
        KeyCode::Backspace => {
            secret.pop();
            Input::Pending
        }
        KeyCode::Char(ch) if !control => {
            secret.push(ch);
            Input::Pending
        }
        _ => Input::Pending,
    }
}

fn say(message: &str) -> PromptResult<()> {
    let mut err = std::io::stderr();
    execute!(
        err,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message)
    )?;
    err.flush()?;
    Ok(())
}

/// Reads a line without echoing it.
fn read_secret(label: &str) -> PromptResult<String> {
    let _raw = RawMode::enable()?;
    say(label)?;

    let mut secret = String::new();
    let outcome = loop {
        if let Event::Key(key) = event::read()? {
            match handle_key(&mut secret, key) {
                Input::Pending => continue,
                outcome => break outcome,
            }
        }
    };
    say("\r\n")?;

    match outcome {
        Input::Aborted => Err("password entry aborted".into()),
        _ => Ok(secret),
    }
}

/// Asks for a new password and its confirmation.
pub fn new_password() -> PromptResult<String> {
    for _ in 0..MAX_ATTEMPTS {
        let password = read_secret("New password: ")?;
        if password.is_empty() {
            say("The password must not be empty.\r\n")?;
            continue;
        }
        if read_secret("Repeat password: ")? == password {
            return Ok(password);
        }
        say("The two passwords differ.\r\n")?;
    }

    Err(format!("no password set after {MAX_ATTEMPTS} attempts").into())
}
