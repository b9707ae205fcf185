use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::Result;

use crate::config::parse_delay_secs;

use super::prompt::read_answer;
use super::watch_history::{Category, CleanupError, Decision};
use super::{Session, write_summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MenuChoice {
    DeleteAll,
    DeleteMovies,
    DeleteEpisodes,
    DryRun,
    SetDelay,
    Exit,
}

pub(crate) fn parse_menu_choice(raw: &str) -> Option<MenuChoice> {
    match raw.trim() {
        "1" => Some(MenuChoice::DeleteAll),
        "2" => Some(MenuChoice::DeleteMovies),
        "3" => Some(MenuChoice::DeleteEpisodes),
        "4" => Some(MenuChoice::DryRun),
        "5" => Some(MenuChoice::SetDelay),
        "6" => Some(MenuChoice::Exit),
        _ => None,
    }
}

pub(crate) fn menu_text(delay: Duration) -> String {
    format!(
        "Welcome to the Plex Watch History Manager!\n\
         1. Delete all watch history (auto-confirm)\n\
         2. Delete only movies (auto-confirm)\n\
         3. Delete only episodes (auto-confirm)\n\
         4. Dry run (preview items)\n\
         5. Set request delay (current: {:.6}s)\n\
         6. Exit",
        delay.as_secs_f64()
    )
}

pub(crate) fn run_menu(
    session: &mut Session<'_>,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<()> {
    loop {
        writeln!(out, "{}", menu_text(session.delay()))?;
        let Some(raw) = read_answer(input, out, "Enter your choice: ")? else {
            return Ok(());
        };

        let filter = match parse_menu_choice(&raw) {
            Some(MenuChoice::DeleteAll) => None,
            Some(MenuChoice::DeleteMovies) => Some(Category::Movie),
            Some(MenuChoice::DeleteEpisodes) => Some(Category::Episode),
            Some(MenuChoice::DryRun) => {
                match session.preview(None, out) {
                    Ok(summary) => writeln!(out, "{}", summary.describe())?,
                    Err(err) => report_run_error(err, out)?,
                }
                continue;
            }
            Some(MenuChoice::SetDelay) => {
                set_delay(session, input, out)?;
                continue;
            }
            Some(MenuChoice::Exit) => return Ok(()),
            None => {
                writeln!(out, "Invalid choice. Please try again.")?;
                continue;
            }
        };

        match session.delete(filter, &mut |_| Decision::Delete, out) {
            Ok(summary) => write_summary(&summary, out)?,
            Err(err) => report_run_error(err, out)?,
        }
    }
}

fn set_delay(session: &mut Session<'_>, input: &mut dyn BufRead, out: &mut dyn Write) -> Result<()> {
    let Some(raw) = read_answer(
        input,
        out,
        "Enter new request delay in seconds (e.g., 0.001 for 1ms): ",
    )?
    else {
        return Ok(());
    };

    let parsed = raw
        .parse::<f64>()
        .map_err(anyhow::Error::from)
        .and_then(parse_delay_secs);
    match parsed {
        Ok(delay) => {
            session.set_delay(delay);
            writeln!(out, "Request delay set to {:.6}s", delay.as_secs_f64())?;
        }
        Err(err) => writeln!(out, "Invalid delay '{raw}': {err}")?,
    }
    Ok(())
}

fn report_run_error(err: CleanupError, out: &mut dyn Write) -> Result<()> {
    if let CleanupError::Output(_) = err {
        return Err(err.into());
    }
    if let CleanupError::Aborted { partial, .. } = &err {
        write_summary(partial, out)?;
    }
    writeln!(out, "❌ {err}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_menu_option() {
        assert_eq!(parse_menu_choice("1"), Some(MenuChoice::DeleteAll));
        assert_eq!(parse_menu_choice(" 2 "), Some(MenuChoice::DeleteMovies));
        assert_eq!(parse_menu_choice("3"), Some(MenuChoice::DeleteEpisodes));
        assert_eq!(parse_menu_choice("4"), Some(MenuChoice::DryRun));
        assert_eq!(parse_menu_choice("5"), Some(MenuChoice::SetDelay));
        assert_eq!(parse_menu_choice("6"), Some(MenuChoice::Exit));
        assert_eq!(parse_menu_choice("7"), None);
        assert_eq!(parse_menu_choice("delete"), None);
    }

    #[test]
    fn menu_text_shows_current_delay_with_microsecond_precision() {
        let text = menu_text(Duration::from_millis(1));
        assert!(text.contains("5. Set request delay (current: 0.001000s)"), "{text}");
    }
}
