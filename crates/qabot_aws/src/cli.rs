use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use qabot_core::params::DEFAULT_PARAMETER_ROOT;
use qabot_core::poll::DEFAULT_TIMEOUT_SECS;
use qabot_core::problems::DEFAULT_PROBLEMS_FILE;
use qabot_core::results::DEFAULT_LIST_LIMIT;

#[derive(Debug, Parser)]
#[command(
    name = "qabot",
    about = "Run question-answering tasks on ECS and read their answers",
    long_about = "Submits one-shot question-answering containers to ECS Fargate,\n\
                  waits for them to stop, and reads the answers they stored in DynamoDB.\n\
                  Deployment values are resolved from SSM under /<root>/<student id>/."
)]
pub struct Cli {
    #[command(flatten)]
    pub deployment: DeploymentArgs,

    /// Print labels without terminal colours
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct DeploymentArgs {
    /// Student identifier scoping every parameter, e.g. 223
    #[arg(long, env = "STUDENT_ID", global = true)]
    pub student_id: Option<String>,

    /// Top-level SSM path segment
    #[arg(
        long,
        env = "QABOT_PARAMETER_ROOT",
        default_value = DEFAULT_PARAMETER_ROOT,
        global = true
    )]
    pub parameter_root: String,

    /// AWS region; defaults to the standard provider chain
    #[arg(long, global = true)]
    pub region: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ask one question and wait for the answer
    Ask {
        /// Passage the answer is extracted from
        context: String,
        /// Question about the passage
        question: String,
        /// Seconds to wait for the task to stop
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u32,
        /// Stop the remote task if it is still running at the timeout
        #[arg(long)]
        stop_on_timeout: bool,
    },
    /// Submit every problem in a file without waiting for answers
    #[command(name = "ask_many")]
    AskMany {
        /// JSON array (or CSV with context,question headers) of problems
        #[arg(long, default_value = DEFAULT_PROBLEMS_FILE)]
        file: PathBuf,
    },
    /// List answers stored so far
    #[command(name = "list_answers")]
    ListAnswers {
        /// Maximum number of answers to read
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
        /// Print one JSON object per line
        #[arg(long)]
        json: bool,
    },
    /// Delete every stored answer
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
