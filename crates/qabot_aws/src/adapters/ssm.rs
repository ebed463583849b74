use aws_sdk_ssm::error::DisplayErrorContext;
use qabot_core::params::ParameterStore;
use tokio::runtime::Handle;

pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
    runtime: Handle,
}

impl SsmParameterStore {
    pub fn new(client: aws_sdk_ssm::Client, runtime: Handle) -> Self {
        Self { client, runtime }
    }
}

impl ParameterStore for SsmParameterStore {
    fn get_parameter(&self, name: &str) -> Result<Option<String>, String> {
        let client = self.client.clone();
        let parameter_name = name.to_string();

        self.runtime.block_on(async move {
            match client.get_parameter().name(parameter_name).send().await {
                Ok(output) => Ok(output
                    .parameter()
                    .and_then(|parameter| parameter.value())
                    .map(str::to_string)),
                Err(error) => {
                    let service_error = error.into_service_error();
                    if service_error.is_parameter_not_found() {
                        Ok(None)
                    } else {
                        Err(format!(
                            "failed to get parameter: {}",
                            DisplayErrorContext(&service_error)
                        ))
                    }
                }
            }
        })
    }

    fn list_parameter_names(&self, path: &str) -> Result<Vec<String>, String> {
        let client = self.client.clone();
        let parameter_path = path.to_string();

        self.runtime.block_on(async move {
            let mut pages = client
                .get_parameters_by_path()
                .path(parameter_path)
                .into_paginator()
                .send();

            let mut names = Vec::new();
            while let Some(page) = pages.next().await {
                let page = page.map_err(|error| {
                    format!("failed to list parameters: {}", DisplayErrorContext(&error))
                })?;
                for parameter in page.parameters() {
                    if let Some(name) = parameter.name() {
                        names.push(name.to_string());
                    }
                }
            }
            Ok::<_, String>(names)
        })
    }
}
