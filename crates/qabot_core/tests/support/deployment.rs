#![allow(dead_code)]

use qabot_core::launch::LaunchRequest;
use qabot_core::params::{NamespacePrefix, QaBotConfig, DEFAULT_PARAMETER_ROOT};
use qabot_core::record::AnswerRecord;
use qabot_core::results::ResultStore;
use qabot_core::testing::{
    sample_config, InMemoryParameterStore, InMemoryResultStore, ScriptedBackend,
};

pub const STUDENT_ID: &str = "223";

/// Fake deployment for one student: parameters, container backend, result table.
pub struct TestDeployment {
    pub prefix: NamespacePrefix,
    pub config: QaBotConfig,
    pub parameters: InMemoryParameterStore,
    pub results: InMemoryResultStore,
}

impl TestDeployment {
    pub fn new() -> Self {
        let prefix = NamespacePrefix::for_student(DEFAULT_PARAMETER_ROOT, STUDENT_ID)
            .expect("valid prefix");
        let config = sample_config();
        let parameters = InMemoryParameterStore::for_config(prefix.as_str(), &config);
        Self {
            prefix,
            config,
            parameters,
            results: InMemoryResultStore::default(),
        }
    }

    /// Backend whose worker answers every launch with `answer`/`score`.
    pub fn answering_backend(
        &self,
        answer: &str,
        score: &str,
        statuses: &[&str],
    ) -> ScriptedBackend {
        let results = self.results.clone();
        let answer = answer.to_string();
        let score = score.to_string();
        ScriptedBackend::new()
            .with_statuses(statuses.iter().copied())
            .with_worker(move |request: &LaunchRequest| {
                results
                    .put_item(&worker_record(request, &answer, &score))
                    .expect("worker write succeeds");
            })
    }
}

/// Row the container writes for its positional `(context, question, item_id)` arguments.
pub fn worker_record(request: &LaunchRequest, answer: &str, score: &str) -> AnswerRecord {
    AnswerRecord {
        context: request.command[0].clone(),
        question: request.command[1].clone(),
        item_id: request.command[2].clone(),
        answer: answer.to_string(),
        score: score.to_string(),
    }
}
