mod menu;
mod prompt;
mod user_id;
mod watch_history;

#[cfg(test)]
mod test_support;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;

use crate::cli::{Cli, Command, OnlyKind};
use crate::config::{Overrides, Settings};
use crate::http::{HttpTransport, Transport};
use crate::paths::{config_file_path, user_id_file_path};

use self::user_id::resolve_user_id;
use self::watch_history::{
    Category, Classified, CleanupError, CleanupOptions, Decision, DeletionOutcome,
    PreviewSummary, RetryPolicy, RunSummary, Sleeper, ThreadSleeper, preview_history,
    run_cleanup,
};

pub fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Command::Menu);
    if let Command::ConfigPath = command {
        println!("config:  {}", config_file_path()?.display());
        println!("user id: {}", user_id_file_path()?.display());
        return Ok(());
    }

    let overrides = Overrides {
        delay_secs: cli.delay,
        max_rate_limit_retries: cli.max_rate_limit_retries,
    };
    let settings = Settings::load(&config_file_path()?, &overrides)?;
    let user_id = resolve_user_id(
        settings.user_id.as_deref(),
        &user_id_file_path()?,
        prompt::ask_user_id,
    )?;

    let transport = HttpTransport::new(
        &settings.endpoint,
        settings.identity.clone(),
        settings.connect_timeout,
        settings.read_timeout,
    );
    let sleeper = ThreadSleeper;
    let mut session = Session {
        transport: &transport,
        sleeper: &sleeper,
        user_id,
        options: CleanupOptions {
            filter: None,
            inter_delete_delay: settings.request_delay,
            page_size: settings.page_size,
            start_cursor: cli.after,
            retry: RetryPolicy {
                default_retry_after: settings.default_retry_after,
                max_rate_limit_retries: settings.max_rate_limit_retries,
            },
        },
    };

    match command {
        Command::Menu => menu::run_menu(&mut session, &mut io::stdin().lock(), &mut io::stdout()),
        Command::Delete { only, yes } => run_delete(&session, only.map(category_for), yes),
        Command::Preview { only } => {
            let summary = session.preview(only.map(category_for), &mut io::stdout())?;
            println!("{}", summary.describe());
            Ok(())
        }
        Command::ConfigPath => Ok(()),
    }
}

pub(crate) struct Session<'a> {
    transport: &'a dyn Transport,
    sleeper: &'a dyn Sleeper,
    user_id: String,
    options: CleanupOptions,
}

impl Session<'_> {
    fn options_for(&self, filter: Option<Category>) -> CleanupOptions {
        CleanupOptions {
            filter,
            ..self.options.clone()
        }
    }

    pub(crate) fn delay(&self) -> Duration {
        self.options.inter_delete_delay
    }

    pub(crate) fn set_delay(&mut self, delay: Duration) {
        self.options.inter_delete_delay = delay;
    }

    pub(crate) fn delete(
        &self,
        filter: Option<Category>,
        decide: &mut dyn FnMut(&Classified) -> Decision,
        out: &mut dyn Write,
    ) -> Result<RunSummary, CleanupError> {
        run_cleanup(
            self.transport,
            self.sleeper,
            &self.user_id,
            &self.options_for(filter),
            decide,
            out,
        )
    }

    pub(crate) fn preview(
        &self,
        filter: Option<Category>,
        out: &mut dyn Write,
    ) -> Result<PreviewSummary, CleanupError> {
        preview_history(self.transport, &self.user_id, &self.options_for(filter), out)
    }
}

fn category_for(kind: OnlyKind) -> Category {
    match kind {
        OnlyKind::Movie => Category::Movie,
        OnlyKind::Episode => Category::Episode,
    }
}

fn run_delete(session: &Session<'_>, filter: Option<Category>, auto_confirm: bool) -> Result<()> {
    let mut prompt_error = None;
    let mut decide = |classified: &Classified| {
        if auto_confirm {
            return Decision::Delete;
        }
        match prompt::confirm(&classified.label) {
            Ok(answer) => Decision::from(answer),
            Err(err) => {
                prompt_error = Some(err);
                Decision::Stop
            }
        }
    };

    let mut stdout = io::stdout();
    match session.delete(filter, &mut decide, &mut stdout) {
        Ok(summary) => write_summary(&summary, &mut stdout)?,
        Err(CleanupError::Aborted { source, partial }) => {
            write_summary(&partial, &mut stdout)?;
            return Err(anyhow::Error::new(source).context("failed to fetch watch history"));
        }
        Err(err) => return Err(err.into()),
    }

    match prompt_error {
        Some(err) => Err(err.context("deletion stopped")),
        None => Ok(()),
    }
}

pub(crate) fn write_summary(summary: &RunSummary, out: &mut dyn Write) -> io::Result<()> {
    write_failures(summary, out)?;
    writeln!(out, "{}", summary.describe())
}

pub(crate) fn write_failures(summary: &RunSummary, out: &mut dyn Write) -> io::Result<()> {
    let failures = summary
        .reports
        .iter()
        .filter_map(|report| match &report.outcome {
            DeletionOutcome::Failed(reason) => Some((report, reason)),
            _ => None,
        })
        .collect::<Vec<_>>();
    if failures.is_empty() {
        return Ok(());
    }

    writeln!(out, "Failed deletions:")?;
    for (report, reason) in failures {
        writeln!(out, "  {} (ID: {}): {reason}", report.label, report.id)?;
    }
    Ok(())
}
