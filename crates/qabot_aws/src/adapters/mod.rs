pub mod dynamodb;
pub mod ecs;
pub mod ssm;

use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tokio::runtime::Handle;

use self::dynamodb::DynamoResultStore;
use self::ecs::EcsExecutionBackend;
use self::ssm::SsmParameterStore;

/// Loads shared SDK configuration; an explicit region wins over the default chain.
pub fn load_sdk_config(runtime: &Handle, region: Option<String>) -> SdkConfig {
    let region_provider =
        RegionProviderChain::first_try(region.map(Region::new)).or_default_provider();
    runtime.block_on(
        aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load(),
    )
}

/// Blocking SDK clients sharing one runtime handle.
#[derive(Clone)]
pub struct AwsClients {
    pub sdk_config: SdkConfig,
    pub runtime: Handle,
}

impl AwsClients {
    pub fn new(sdk_config: SdkConfig, runtime: Handle) -> Self {
        Self {
            sdk_config,
            runtime,
        }
    }

    pub fn parameter_store(&self) -> SsmParameterStore {
        let client = aws_sdk_ssm::Client::new(&self.sdk_config);
        SsmParameterStore::new(client, self.runtime.clone())
    }

    pub fn execution_backend(&self) -> EcsExecutionBackend {
        let client = aws_sdk_ecs::Client::new(&self.sdk_config);
        EcsExecutionBackend::new(client, self.runtime.clone())
    }

    pub fn result_store(&self, table_name: &str) -> DynamoResultStore {
        let client = aws_sdk_dynamodb::Client::new(&self.sdk_config);
        DynamoResultStore::new(client, table_name, self.runtime.clone())
    }
}
