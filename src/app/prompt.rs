use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result, bail};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

pub(crate) fn read_answer(
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    prompt: &str,
) -> Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush().context("failed to flush output")?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub(crate) fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

pub(crate) fn ask_user_id() -> Result<String> {
    let stdin = io::stdin();
    match read_answer(&mut stdin.lock(), &mut io::stdout(), "Enter your Plex User UUID: ")? {
        Some(answer) => Ok(answer),
        None => bail!("stdin closed before a user UUID was entered"),
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

enum KeyAnswer {
    Yes,
    No,
    Interrupt,
}

fn read_key_answer() -> Result<KeyAnswer> {
    loop {
        let Event::Key(key) = event::read().context("failed to read key")? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(KeyAnswer::Interrupt);
        }
        return Ok(match key.code {
            KeyCode::Char('y' | 'Y') => KeyAnswer::Yes,
            _ => KeyAnswer::No,
        });
    }
}

/// Ask whether to delete `label`. On a terminal a single key press answers;
/// piped input is read a line at a time. Only `y` means yes.
pub(crate) fn confirm(label: &str) -> Result<bool> {
    let question = format!("Delete {label}? (y/n): ");
    let stdin = io::stdin();

    if !stdin.is_terminal() {
        return match read_answer(&mut stdin.lock(), &mut io::stdout(), &question)? {
            Some(answer) => Ok(is_yes(&answer)),
            None => bail!("stdin closed while waiting for confirmation"),
        };
    }

    let mut stdout = io::stdout();
    write!(stdout, "{question}")?;
    stdout.flush().context("failed to flush stdout")?;

    let answer = {
        let _raw = RawModeGuard::enter()?;
        read_key_answer()?
    };

    match answer {
        KeyAnswer::Yes => {
            writeln!(stdout, "y")?;
            Ok(true)
        }
        KeyAnswer::No => {
            writeln!(stdout, "n")?;
            Ok(false)
        }
        KeyAnswer::Interrupt => {
            writeln!(stdout)?;
            bail!("interrupted while waiting for confirmation")
        }
    }
}
