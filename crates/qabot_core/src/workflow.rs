use tracing::{info, warn};

use crate::error::QaBotError;
use crate::launch::{ExecutionBackend, SubmittedTask, TaskSubmitter};
use crate::params::QaBotConfig;
use crate::poll::{await_terminal, PollOutcome, PollPolicy, Sleeper};
use crate::record::AnswerRecord;
use crate::results::{fetch, ResultStore};

pub const STOP_ON_TIMEOUT_REASON: &str = "qabot client gave up waiting";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AskOptions {
    pub policy: PollPolicy,
    /// Ask the backend to stop the task when the local wait times out.
    pub stop_on_timeout: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStop {
    NotRequested,
    Requested,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    Answered {
        task: SubmittedTask,
        record: AnswerRecord,
    },
    /// Local wait expired; the outcome of the remote task is unknown.
    TimedOut {
        task: SubmittedTask,
        remote_stop: RemoteStop,
    },
    /// The task stopped but no result row exists (yet) for its correlation id.
    ResultMissing { task: SubmittedTask },
}

/// Progress notifications for an interactive caller.
pub trait AskObserver {
    fn submitted(&mut self, _task: &SubmittedTask) {}
    fn polled(&mut self, _poll: u32, _status: &str) {}
}

impl AskObserver for () {}

pub struct AskWorkflow<'a, B: ExecutionBackend + ?Sized, S: ResultStore + ?Sized> {
    pub config: &'a QaBotConfig,
    pub backend: &'a B,
    pub results: &'a S,
    pub sleeper: &'a dyn Sleeper,
}

impl<'a, B: ExecutionBackend + ?Sized, S: ResultStore + ?Sized> AskWorkflow<'a, B, S> {
    /// Submit, wait for the terminal state, then look up the result row.
    pub fn ask(
        &self,
        context: &str,
        question: &str,
        options: AskOptions,
        observer: &mut dyn AskObserver,
    ) -> Result<AskOutcome, QaBotError> {
        let task = TaskSubmitter::new(self.backend, self.config).submit(context, question)?;
        observer.submitted(&task);

        let outcome = await_terminal(
            self.backend,
            &self.config.cluster_name,
            &task.run_id,
            options.policy,
            self.sleeper,
            &mut |poll, status| observer.polled(poll, status),
        )?;

        if let PollOutcome::TimedOut { polls } = outcome {
            warn!(run_id = %task.run_id, polls, "task did not stop before local timeout");
            let remote_stop = if options.stop_on_timeout {
                self.stop_remote(&task)
            } else {
                RemoteStop::NotRequested
            };
            return Ok(AskOutcome::TimedOut { task, remote_stop });
        }

        match fetch(self.results, &task.correlation_id)? {
            Some(record) => Ok(AskOutcome::Answered { task, record }),
            None => {
                warn!(
                    correlation_id = %task.correlation_id,
                    "task stopped without a result record"
                );
                Ok(AskOutcome::ResultMissing { task })
            }
        }
    }

    fn stop_remote(&self, task: &SubmittedTask) -> RemoteStop {
        let cluster = &self.config.cluster_name;
        let run_id = &task.run_id;
        match self.backend.stop_task(cluster, run_id, STOP_ON_TIMEOUT_REASON) {
            Ok(()) => {
                info!(run_id = %run_id, "requested remote stop after timeout");
                RemoteStop::Requested
            }
            Err(message) => {
                warn!(run_id = %run_id, error = %message, "remote stop failed");
                RemoteStop::Failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_config, InMemoryResultStore, RecordingSleeper, ScriptedBackend};

    fn options(max_polls: u32, stop_on_timeout: bool) -> AskOptions {
        AskOptions {
            policy: PollPolicy::with_timeout_secs(max_polls),
            stop_on_timeout,
        }
    }

    #[test]
    fn timeout_without_flag_leaves_remote_task_running() {
        let backend = ScriptedBackend::new().with_statuses(["RUNNING"]);
        let results = InMemoryResultStore::default();
        let config = sample_config();
        let sleeper = RecordingSleeper::default();
        let workflow = AskWorkflow {
            config: &config,
            backend: &backend,
            results: &results,
            sleeper: &sleeper,
        };

        let outcome = workflow
            .ask("c", "q", options(3, false), &mut ())
            .expect("timeout is an outcome");

        assert!(matches!(
            outcome,
            AskOutcome::TimedOut {
                remote_stop: RemoteStop::NotRequested,
                ..
            }
        ));
        assert!(backend.stop_requests().is_empty());
    }

    #[test]
    fn timeout_with_flag_requests_remote_stop() {
        let backend = ScriptedBackend::new().with_statuses(["RUNNING"]);
        let results = InMemoryResultStore::default();
        let config = sample_config();
        let sleeper = RecordingSleeper::default();
        let workflow = AskWorkflow {
            config: &config,
            backend: &backend,
            results: &results,
            sleeper: &sleeper,
        };

        let outcome = workflow
            .ask("c", "q", options(2, true), &mut ())
            .expect("timeout is an outcome");

        let AskOutcome::TimedOut { task, remote_stop } = outcome else {
            panic!("expected timeout");
        };
        assert_eq!(remote_stop, RemoteStop::Requested);
        assert_eq!(backend.stop_requests(), vec![task.run_id]);
    }

    #[test]
    fn stopped_task_without_row_is_result_missing() {
        let backend = ScriptedBackend::new().with_statuses(["STOPPED"]);
        let results = InMemoryResultStore::default();
        let config = sample_config();
        let sleeper = RecordingSleeper::default();
        let workflow = AskWorkflow {
            config: &config,
            backend: &backend,
            results: &results,
            sleeper: &sleeper,
        };

        let outcome = workflow
            .ask("c", "q", options(5, false), &mut ())
            .expect("missing result is an outcome");
        assert!(matches!(outcome, AskOutcome::ResultMissing { .. }));
    }

    #[test]
    fn polls_the_submitted_task_on_the_configured_cluster() {
        let backend = ScriptedBackend::new().with_statuses(["RUNNING", "RUNNING", "STOPPED"]);
        let results = InMemoryResultStore::default();
        let config = sample_config();
        let sleeper = RecordingSleeper::default();
        let workflow = AskWorkflow {
            config: &config,
            backend: &backend,
            results: &results,
            sleeper: &sleeper,
        };

        let outcome = workflow
            .ask("c", "q", options(5, false), &mut ())
            .expect("missing result is an outcome");

        let AskOutcome::ResultMissing { task } = outcome else {
            panic!("expected a missing result");
        };
        let expected = (config.cluster_name.clone(), task.run_id);
        assert_eq!(backend.status_lookups(), vec![expected; 3]);
    }

    #[test]
    fn submission_failure_aborts_before_polling() {
        let backend = ScriptedBackend::new().reject_launch(0, "AccessDeniedException");
        let results = InMemoryResultStore::default();
        let config = sample_config();
        let sleeper = RecordingSleeper::default();
        let workflow = AskWorkflow {
            config: &config,
            backend: &backend,
            results: &results,
            sleeper: &sleeper,
        };

        let error = workflow
            .ask("c", "q", options(5, false), &mut ())
            .expect_err("submission fails");
        assert!(matches!(error, QaBotError::Submission(_)));
        assert_eq!(backend.status_queries(), 0);
    }
}
