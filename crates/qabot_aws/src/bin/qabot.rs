use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use qabot_aws::adapters::{load_sdk_config, AwsClients};
use qabot_aws::cli::{Cli, Commands, DeploymentArgs};
use qabot_aws::commands::{
    resolve_config, run_ask, run_ask_many, run_clear, run_list_answers, CommandError,
};
use qabot_aws::render::LabelStyle;
use qabot_core::params::{NamespacePrefix, QaBotConfig};
use qabot_core::poll::{PollPolicy, ThreadSleeper};
use qabot_core::workflow::{AskOptions, AskWorkflow};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

const MISSING_STUDENT_ID: &str =
    "STUDENT_ID is not set. Please set it with 'export STUDENT_ID=223' or pass --student-id";

fn namespace(args: &DeploymentArgs) -> Result<NamespacePrefix> {
    let student_id = args.student_id.as_deref().context(MISSING_STUDENT_ID)?;
    Ok(NamespacePrefix::for_student(&args.parameter_root, student_id)?)
}

fn load_config(clients: &AwsClients, prefix: NamespacePrefix) -> Result<QaBotConfig> {
    let parameters = clients.parameter_store();
    let config = resolve_config(&parameters, prefix, &mut io::stderr().lock())?;
    Ok(config)
}

/// Colours only reach an interactive terminal and never mix into JSON output.
fn label_style(cli: &Cli) -> LabelStyle {
    let json = matches!(cli.command, Commands::ListAnswers { json: true, .. });
    let enabled = !cli.no_color && !json && io::stdout().is_terminal();
    if !enabled {
        colored::control::set_override(false);
    }
    LabelStyle::from_color(enabled)
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let reported = error
                .downcast_ref::<CommandError>()
                .is_some_and(CommandError::already_reported);
            if !reported {
                eprintln!("Error: {error:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let style = label_style(&cli);
    let prefix = namespace(&cli.deployment)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let sdk_config = load_sdk_config(runtime.handle(), cli.deployment.region.clone());
    let clients = AwsClients::new(sdk_config, runtime.handle().clone());

    let config = load_config(&clients, prefix)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Ask {
            context,
            question,
            timeout,
            stop_on_timeout,
        } => {
            let backend = clients.execution_backend();
            let results = clients.result_store(&config.table_name);
            let workflow = AskWorkflow {
                config: &config,
                backend: &backend,
                results: &results,
                sleeper: &ThreadSleeper,
            };
            let options = AskOptions {
                policy: PollPolicy::with_timeout_secs(timeout),
                stop_on_timeout,
            };
            run_ask(&workflow, &context, &question, options, style, &mut out)?;
        }
        Commands::AskMany { file } => {
            let backend = clients.execution_backend();
            run_ask_many(&backend, &config, &file, &mut out)?;
        }
        Commands::ListAnswers { limit, json } => {
            let results = clients.result_store(&config.table_name);
            run_list_answers(&results, limit, json, style, &mut out)?;
        }
        Commands::Clear { yes } => {
            let results = clients.result_store(&config.table_name);
            run_clear(
                &results,
                &config.table_name,
                yes,
                &mut io::stdin().lock(),
                &mut out,
            )?;
        }
    }

    out.flush()?;
    Ok(())
}
