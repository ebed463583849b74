use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, ContainerOverride, Failure, LaunchType,
    NetworkConfiguration, TaskOverride,
};
use qabot_core::launch::{ExecutionBackend, LaunchRequest};
use tokio::runtime::Handle;

pub struct EcsExecutionBackend {
    client: aws_sdk_ecs::Client,
    runtime: Handle,
}

impl EcsExecutionBackend {
    pub fn new(client: aws_sdk_ecs::Client, runtime: Handle) -> Self {
        Self { client, runtime }
    }
}

pub fn network_configuration(request: &LaunchRequest) -> Result<NetworkConfiguration, String> {
    let assign_public_ip = if request.assign_public_ip {
        AssignPublicIp::Enabled
    } else {
        AssignPublicIp::Disabled
    };
    let awsvpc = AwsVpcConfiguration::builder()
        .set_subnets(Some(request.subnets.clone()))
        .assign_public_ip(assign_public_ip)
        .build()
        .map_err(|error| format!("invalid network configuration: {error}"))?;
    Ok(NetworkConfiguration::builder()
        .awsvpc_configuration(awsvpc)
        .build())
}

pub fn task_override(request: &LaunchRequest) -> TaskOverride {
    TaskOverride::builder()
        .container_overrides(
            ContainerOverride::builder()
                .name(request.container_name.clone())
                .set_command(Some(request.command.clone()))
                .build(),
        )
        .build()
}

fn describe_failures(failures: &[Failure]) -> String {
    if failures.is_empty() {
        return "no failure reported".to_string();
    }
    failures
        .iter()
        .map(|failure| {
            format!(
                "{} ({})",
                failure.reason().unwrap_or("unknown reason"),
                failure.arn().unwrap_or("unknown resource")
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl ExecutionBackend for EcsExecutionBackend {
    fn run_task(&self, request: &LaunchRequest) -> Result<String, String> {
        let network = network_configuration(request)?;
        let overrides = task_override(request);
        let client = self.client.clone();
        let cluster = request.cluster.clone();
        let task_definition = request.task_definition.clone();

        self.runtime.block_on(async move {
            let output = client
                .run_task()
                .cluster(cluster)
                .task_definition(task_definition)
                .count(1)
                .launch_type(LaunchType::Fargate)
                .network_configuration(network)
                .overrides(overrides)
                .send()
                .await
                .map_err(|error| format!("failed to run task: {}", DisplayErrorContext(&error)))?;

            output
                .tasks()
                .first()
                .and_then(|task| task.task_arn())
                .map(str::to_string)
                .ok_or_else(|| {
                    format!(
                        "run_task started no task: {}",
                        describe_failures(output.failures())
                    )
                })
        })
    }

    fn task_status(&self, cluster: &str, run_id: &str) -> Result<String, String> {
        let client = self.client.clone();
        let cluster = cluster.to_string();
        let task_arn = run_id.to_string();

        self.runtime.block_on(async move {
            let output = client
                .describe_tasks()
                .cluster(cluster)
                .tasks(task_arn.clone())
                .send()
                .await
                .map_err(|error| {
                    format!("failed to describe task: {}", DisplayErrorContext(&error))
                })?;

            match output.tasks().first() {
                Some(task) => Ok(task.last_status().unwrap_or_default().to_string()),
                None => Err(format!(
                    "task {task_arn} not found: {}",
                    describe_failures(output.failures())
                )),
            }
        })
    }

    fn stop_task(&self, cluster: &str, run_id: &str, reason: &str) -> Result<(), String> {
        let client = self.client.clone();
        let cluster = cluster.to_string();
        let task_arn = run_id.to_string();
        let reason = reason.to_string();

        self.runtime.block_on(async move {
            client
                .stop_task()
                .cluster(cluster)
                .task(task_arn)
                .reason(reason)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| format!("failed to stop task: {}", DisplayErrorContext(&error)))
        })
    }
}
