use std::io::{self, BufRead, Write};
use std::path::Path;

use qabot_core::error::QaBotError;
use qabot_core::launch::{ExecutionBackend, SubmittedTask, TaskSubmitter};
use qabot_core::params::{NamespacePrefix, ParameterResolver, ParameterStore, QaBotConfig};
use qabot_core::problems::load_problems;
use qabot_core::results::{clear_all, list_recent, ResultStore};
use qabot_core::workflow::{AskObserver, AskOptions, AskOutcome, AskWorkflow, RemoteStop};
use thiserror::Error;
use tracing::info;

use crate::render::{write_configuration_error, write_listing, write_record, LabelStyle};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    QaBot(#[from] QaBotError),
    /// Details were already written to the diagnostic stream.
    #[error("{0}")]
    Reported(QaBotError),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CommandError {
    pub fn already_reported(&self) -> bool {
        matches!(self, Self::Reported(_))
    }
}

/// Resolves the deployment bundle, printing the sibling-key diagnostic to
/// `err` when a parameter is missing.
pub fn resolve_config<P: ParameterStore + ?Sized>(
    store: &P,
    prefix: NamespacePrefix,
    err: &mut dyn Write,
) -> Result<QaBotConfig, CommandError> {
    let resolver = ParameterResolver::new(store, prefix);
    match resolver.load_config() {
        Ok(config) => Ok(config),
        Err(error) => {
            write_configuration_error(err, &error)?;
            Err(CommandError::Reported(error))
        }
    }
}

/// Prints submission details and one dot per status poll.
///
/// Observer hooks cannot fail, so the first write error is held until
/// `finish`.
struct ConsoleProgress<'w> {
    out: &'w mut dyn Write,
    failed: Option<io::Error>,
}

impl<'w> ConsoleProgress<'w> {
    fn new(out: &'w mut dyn Write) -> Self {
        Self { out, failed: None }
    }

    fn emit(&mut self, write: impl FnOnce(&mut dyn Write) -> io::Result<()>) {
        if self.failed.is_some() {
            return;
        }
        if let Err(error) = write(&mut *self.out) {
            self.failed = Some(error);
        }
    }

    fn dot(&mut self) {
        self.emit(|out| {
            write!(out, ".")?;
            out.flush()
        });
    }

    fn finish(self) -> io::Result<()> {
        match self.failed {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AskObserver for ConsoleProgress<'_> {
    fn submitted(&mut self, task: &SubmittedTask) {
        self.emit(|out| {
            writeln!(out, "Task ARN: {}", task.run_id)?;
            writeln!(out, "Waiting for the task to finish...")
        });
    }

    fn polled(&mut self, _poll: u32, _status: &str) {
        self.dot();
    }
}

pub fn run_ask<B, S>(
    workflow: &AskWorkflow<'_, B, S>,
    context: &str,
    question: &str,
    options: AskOptions,
    style: LabelStyle,
    out: &mut dyn Write,
) -> Result<AskOutcome, CommandError>
where
    B: ExecutionBackend + ?Sized,
    S: ResultStore + ?Sized,
{
    writeln!(out, "Submitting task...")?;
    let mut progress = ConsoleProgress::new(out);
    let outcome = workflow.ask(context, question, options, &mut progress)?;
    progress.finish()?;
    writeln!(out)?;

    match &outcome {
        AskOutcome::Answered { record, .. } => write_record(out, record, style)?,
        AskOutcome::TimedOut { task, remote_stop } => {
            writeln!(out, "Sorry, task did not finish until timeout!")?;
            match remote_stop {
                RemoteStop::NotRequested => writeln!(
                    out,
                    "The task may still be running; its answer will be stored under {}.",
                    task.correlation_id
                )?,
                RemoteStop::Requested => writeln!(out, "Requested the task to stop.")?,
                RemoteStop::Failed(error) => writeln!(out, "Could not stop the task: {error}")?,
            }
        }
        AskOutcome::ResultMissing { task } => writeln!(
            out,
            "The task stopped but no answer was stored for {} yet. Try `list_answers` later.",
            task.correlation_id
        )?,
    }
    Ok(outcome)
}

pub fn run_ask_many<B: ExecutionBackend + ?Sized>(
    backend: &B,
    config: &QaBotConfig,
    problems_file: &Path,
    out: &mut dyn Write,
) -> Result<usize, CommandError> {
    let problems = load_problems(problems_file)?;
    writeln!(out, "Submitting task...")?;

    let submitter = TaskSubmitter::new(backend, config);
    let mut progress = ConsoleProgress::new(out);
    let result = submitter.submit_all(&problems, &mut |_| progress.dot());
    progress.finish()?;
    writeln!(out)?;

    let summary = result?;
    info!(submitted = summary.submitted.len(), "batch submitted");
    writeln!(out, "Submitted {} tasks.", summary.submitted.len())?;
    Ok(summary.submitted.len())
}

pub fn run_list_answers<S: ResultStore + ?Sized>(
    store: &S,
    limit: usize,
    json: bool,
    style: LabelStyle,
    out: &mut dyn Write,
) -> Result<usize, CommandError> {
    let records = list_recent(store, limit)?;
    write_listing(out, &records, json, style)?;
    Ok(records.len())
}

/// Returns `None` when the user declines the confirmation.
pub fn run_clear<S: ResultStore + ?Sized>(
    store: &S,
    table_name: &str,
    skip_confirmation: bool,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<Option<usize>, CommandError> {
    let prompt = format!("Delete all answers in {table_name}? [y/N] ");
    if !skip_confirmation && !confirm(input, out, &prompt)? {
        writeln!(out, "Aborted.")?;
        return Ok(None);
    }

    let deleted = clear_all(store)?;
    writeln!(out, "Deleted all answers in the DynamoDB! ({deleted} items)")?;
    Ok(Some(deleted))
}

pub fn confirm(input: &mut dyn BufRead, out: &mut dyn Write, prompt: &str) -> io::Result<bool> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
