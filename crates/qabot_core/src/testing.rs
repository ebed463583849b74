//! In-memory stand-ins for the parameter store, execution backend, and result
//! table. Shared by unit tests here and integration tests in dependent crates.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::launch::{ExecutionBackend, LaunchRequest, TERMINAL_STATUS};
use crate::params::{ParameterKey, ParameterStore, QaBotConfig};
use crate::poll::Sleeper;
use crate::record::AnswerRecord;
use crate::results::ResultStore;

pub fn sample_config() -> QaBotConfig {
    QaBotConfig {
        cluster_name: "qabot-cluster-223".to_string(),
        task_definition_arn: "arn:aws:ecs:us-west-2:123456789012:task-definition/qabot-task-223:1"
            .to_string(),
        container_name: "EcsClusterQaBot-Container-223".to_string(),
        subnet_id: "subnet-0abc".to_string(),
        table_name: "qabot-table-223".to_string(),
    }
}

pub fn sample_record(item_id: &str) -> AnswerRecord {
    AnswerRecord {
        item_id: item_id.to_string(),
        context: "Paris is the capital of France.".to_string(),
        question: "What is the capital of France?".to_string(),
        answer: "Paris".to_string(),
        score: "0.98".to_string(),
    }
}

#[derive(Debug, Default)]
pub struct InMemoryParameterStore {
    values: BTreeMap<String, String>,
    lookups: Mutex<Vec<String>>,
    lookup_failure: Option<String>,
    listing_failure: Option<String>,
}

impl InMemoryParameterStore {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    /// Store for `prefix` holding all five deployment parameters of `config`.
    pub fn for_config(prefix: &str, config: &QaBotConfig) -> Self {
        let values = ParameterKey::ALL
            .into_iter()
            .map(|key| {
                let value = match key {
                    ParameterKey::ClusterName => &config.cluster_name,
                    ParameterKey::TaskDefinitionArn => &config.task_definition_arn,
                    ParameterKey::ContainerName => &config.container_name,
                    ParameterKey::Subnet => &config.subnet_id,
                    ParameterKey::TableName => &config.table_name,
                };
                (format!("{prefix}{key}"), value.clone())
            })
            .collect();
        Self {
            values,
            ..Self::default()
        }
    }

    pub fn with_lookup_failure(mut self, message: &str) -> Self {
        self.lookup_failure = Some(message.to_string());
        self
    }

    pub fn with_listing_failure(mut self, message: &str) -> Self {
        self.listing_failure = Some(message.to_string());
        self
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values.clone()
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().expect("poisoned mutex").clone()
    }
}

impl ParameterStore for InMemoryParameterStore {
    fn get_parameter(&self, name: &str) -> Result<Option<String>, String> {
        self.lookups.lock().expect("poisoned mutex").push(name.to_string());
        if let Some(message) = &self.lookup_failure {
            return Err(message.clone());
        }
        Ok(self.values.get(name).cloned())
    }

    fn list_parameter_names(&self, path: &str) -> Result<Vec<String>, String> {
        if let Some(message) = &self.listing_failure {
            return Err(message.clone());
        }
        Ok(self
            .values
            .keys()
            .filter(|name| {
                name.strip_prefix(path)
                    .map(|rest| !rest.is_empty() && !rest.contains('/'))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}

type WorkerFn = Box<dyn Fn(&LaunchRequest) + Send + Sync>;

/// Execution backend that replays a fixed status sequence for every task.
///
/// The last status repeats once the sequence is exhausted.
pub struct ScriptedBackend {
    statuses: Vec<String>,
    rejections: HashMap<usize, String>,
    status_failure: Option<String>,
    worker: Option<WorkerFn>,
    launches: Mutex<Vec<LaunchRequest>>,
    status_lookups: Mutex<Vec<(String, String)>>,
    stop_requests: Mutex<Vec<String>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            statuses: vec![TERMINAL_STATUS.to_string()],
            rejections: HashMap::new(),
            status_failure: None,
            worker: None,
            launches: Mutex::new(Vec::new()),
            status_lookups: Mutex::new(Vec::new()),
            stop_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_statuses<'a>(mut self, statuses: impl IntoIterator<Item = &'a str>) -> Self {
        self.statuses = statuses.into_iter().map(str::to_string).collect();
        self
    }

    /// Rejects the launch attempt with zero-based index `attempt`.
    pub fn reject_launch(mut self, attempt: usize, message: &str) -> Self {
        self.rejections.insert(attempt, message.to_string());
        self
    }

    pub fn fail_status(mut self, message: &str) -> Self {
        self.status_failure = Some(message.to_string());
        self
    }

    /// Runs `worker` for every accepted launch, standing in for the container.
    pub fn with_worker(mut self, worker: impl Fn(&LaunchRequest) + Send + Sync + 'static) -> Self {
        self.worker = Some(Box::new(worker));
        self
    }

    pub fn launches(&self) -> Vec<LaunchRequest> {
        self.launches.lock().expect("poisoned mutex").clone()
    }

    pub fn status_queries(&self) -> usize {
        self.status_lookups.lock().expect("poisoned mutex").len()
    }

    /// `(cluster, run_id)` of every status query, in order.
    pub fn status_lookups(&self) -> Vec<(String, String)> {
        self.status_lookups.lock().expect("poisoned mutex").clone()
    }

    pub fn stop_requests(&self) -> Vec<String> {
        self.stop_requests.lock().expect("poisoned mutex").clone()
    }
}

impl ExecutionBackend for ScriptedBackend {
    fn run_task(&self, request: &LaunchRequest) -> Result<String, String> {
        let attempt = {
            let mut launches = self.launches.lock().expect("poisoned mutex");
            launches.push(request.clone());
            launches.len() - 1
        };
        if let Some(message) = self.rejections.get(&attempt) {
            return Err(message.clone());
        }
        if let Some(worker) = &self.worker {
            worker(request);
        }
        let task_number = attempt + 1;
        Ok(format!("arn:aws:ecs:task/{}/task-{task_number}", request.cluster))
    }

    fn task_status(&self, cluster: &str, run_id: &str) -> Result<String, String> {
        if let Some(message) = &self.status_failure {
            return Err(message.clone());
        }
        let mut lookups = self.status_lookups.lock().expect("poisoned mutex");
        let index = lookups.len().min(self.statuses.len().saturating_sub(1));
        lookups.push((cluster.to_string(), run_id.to_string()));
        self.statuses
            .get(index)
            .cloned()
            .ok_or_else(|| "no scripted status".to_string())
    }

    fn stop_task(&self, _cluster: &str, run_id: &str, _reason: &str) -> Result<(), String> {
        self.stop_requests.lock().expect("poisoned mutex").push(run_id.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct TableState {
    rows: BTreeMap<String, AnswerRecord>,
}

/// Result table backed by a shared map. Clones observe the same rows.
#[derive(Debug, Clone)]
pub struct InMemoryResultStore {
    state: Arc<Mutex<TableState>>,
    page_size: usize,
    failure: Option<String>,
}

impl Default for InMemoryResultStore {
    fn default() -> Self {
        Self::with_page_size(100)
    }
}

impl InMemoryResultStore {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(TableState::default())),
            page_size: page_size.max(1),
            failure: None,
        }
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.state.lock().expect("poisoned mutex").rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> Result<(), String> {
        match &self.failure {
            Some(message) => Err(message.clone()),
            None => Ok(()),
        }
    }
}

impl ResultStore for InMemoryResultStore {
    fn get_item(&self, item_id: &str) -> Result<Option<AnswerRecord>, String> {
        self.check()?;
        let state = self.state.lock().expect("poisoned mutex");
        Ok(state.rows.get(item_id).cloned())
    }

    fn put_item(&self, record: &AnswerRecord) -> Result<(), String> {
        self.check()?;
        self.state
            .lock()
            .expect("poisoned mutex")
            .rows
            .insert(record.item_id.clone(), record.clone());
        Ok(())
    }

    fn delete_item(&self, item_id: &str) -> Result<(), String> {
        self.check()?;
        self.state.lock().expect("poisoned mutex").rows.remove(item_id);
        Ok(())
    }

    fn scan(&self, limit: usize) -> Result<Vec<AnswerRecord>, String> {
        self.check()?;
        let state = self.state.lock().expect("poisoned mutex");
        Ok(state
            .rows
            .values()
            .take(limit.min(self.page_size))
            .cloned()
            .collect())
    }

    fn scan_item_ids(&self) -> Result<Vec<String>, String> {
        self.check()?;
        let state = self.state.lock().expect("poisoned mutex");
        Ok(state.rows.keys().cloned().collect())
    }
}

#[derive(Debug, Default)]
pub struct RecordingSleeper {
    naps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn naps(&self) -> usize {
        self.naps.lock().expect("poisoned mutex").len()
    }

    pub fn total(&self) -> Duration {
        self.naps.lock().expect("poisoned mutex").iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.naps.lock().expect("poisoned mutex").push(duration);
    }
}
