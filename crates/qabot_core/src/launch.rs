use tracing::{info, warn};

use crate::error::QaBotError;
use crate::params::QaBotConfig;
use crate::problems::Problem;
use crate::record::CorrelationId;

/// Lifecycle status reported by the execution backend once a task is done.
pub const TERMINAL_STATUS: &str = "STOPPED";

/// Everything the backend needs to start one task instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub cluster: String,
    pub task_definition: String,
    pub container_name: String,
    pub command: Vec<String>,
    pub subnets: Vec<String>,
    pub assign_public_ip: bool,
}

/// Container execution backend (ECS in production).
pub trait ExecutionBackend {
    /// Starts exactly one task and returns its provider-assigned run id.
    fn run_task(&self, request: &LaunchRequest) -> Result<String, String>;

    /// Current lifecycle status string of `run_id`, e.g. `RUNNING` or `STOPPED`.
    fn task_status(&self, cluster: &str, run_id: &str) -> Result<String, String>;

    fn stop_task(&self, cluster: &str, run_id: &str, reason: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTask {
    pub run_id: String,
    pub correlation_id: CorrelationId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub submitted: Vec<SubmittedTask>,
}

pub struct TaskSubmitter<'a, B: ExecutionBackend + ?Sized> {
    backend: &'a B,
    config: &'a QaBotConfig,
}

impl<'a, B: ExecutionBackend + ?Sized> TaskSubmitter<'a, B> {
    pub fn new(backend: &'a B, config: &'a QaBotConfig) -> Self {
        Self { backend, config }
    }

    pub fn launch_request(
        &self,
        context: &str,
        question: &str,
        correlation_id: &CorrelationId,
    ) -> LaunchRequest {
        LaunchRequest {
            cluster: self.config.cluster_name.clone(),
            task_definition: self.config.task_definition_arn.clone(),
            container_name: self.config.container_name.clone(),
            command: vec![
                context.to_string(),
                question.to_string(),
                correlation_id.as_str().to_string(),
            ],
            subnets: vec![self.config.subnet_id.clone()],
            assign_public_ip: true,
        }
    }

    /// Launches one task answering `question` against `context`. Does not wait
    /// for it to finish.
    pub fn submit(&self, context: &str, question: &str) -> Result<SubmittedTask, QaBotError> {
        let correlation_id = CorrelationId::generate();
        let request = self.launch_request(context, question, &correlation_id);
        let run_id = match self.backend.run_task(&request) {
            Ok(run_id) => run_id,
            Err(message) => return Err(QaBotError::Submission(message)),
        };
        info!(
            run_id = %run_id,
            correlation_id = %correlation_id,
            cluster = %request.cluster,
            "task submitted"
        );
        Ok(SubmittedTask {
            run_id,
            correlation_id,
        })
    }

    /// Submits one task per problem without waiting on any of them.
    ///
    /// A rejected submission does not stop the batch; once every problem has
    /// been tried the first rejection is returned with the accepted count.
    pub fn submit_all(
        &self,
        problems: &[Problem],
        on_submitted: &mut dyn FnMut(&SubmittedTask),
    ) -> Result<BatchSummary, QaBotError> {
        let mut submitted = Vec::with_capacity(problems.len());
        let mut failed = 0usize;
        let mut first_error: Option<String> = None;

        for (index, problem) in problems.iter().enumerate() {
            match self.submit(&problem.context, &problem.question) {
                Ok(task) => {
                    on_submitted(&task);
                    submitted.push(task);
                }
                Err(error) => {
                    warn!(problem_index = index, error = %error, "submission rejected");
                    failed += 1;
                    first_error.get_or_insert_with(|| error.to_string());
                }
            }
        }

        match first_error {
            Some(first_error) => Err(QaBotError::BatchSubmission {
                submitted: submitted.len(),
                failed,
                first_error,
            }),
            None => Ok(BatchSummary { submitted }),
        }
    }
}
