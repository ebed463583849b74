mod support;

use qabot_core::launch::{SubmittedTask, TaskSubmitter};
use qabot_core::params::ParameterResolver;
use qabot_core::poll::PollPolicy;
use qabot_core::problems::Problem;
use qabot_core::record::AnswerRecord;
use qabot_core::results::{clear_all, fetch, list_recent};
use qabot_core::testing::RecordingSleeper;
use qabot_core::workflow::{AskObserver, AskOptions, AskOutcome, AskWorkflow};
use support::deployment::TestDeployment;

#[derive(Default)]
struct ProgressLog {
    submitted: Option<String>,
    statuses: Vec<String>,
}

impl AskObserver for ProgressLog {
    fn submitted(&mut self, task: &SubmittedTask) {
        self.submitted = Some(task.run_id.clone());
    }

    fn polled(&mut self, _poll: u32, status: &str) {
        self.statuses.push(status.to_string());
    }
}

#[test]
fn ask_returns_worker_record_verbatim() {
    let deployment = TestDeployment::new();
    let resolver = ParameterResolver::new(&deployment.parameters, deployment.prefix.clone());
    let config = resolver.load_config().expect("deployment parameters present");
    let statuses = ["PROVISIONING", "RUNNING", "STOPPED"];
    let backend = deployment.answering_backend("Paris", "0.98", &statuses);
    let sleeper = RecordingSleeper::default();
    let workflow = AskWorkflow {
        config: &config,
        backend: &backend,
        results: &deployment.results,
        sleeper: &sleeper,
    };
    let mut progress = ProgressLog::default();

    let outcome = workflow
        .ask(
            "Paris is the capital of France.",
            "What is the capital of France?",
            AskOptions {
                policy: PollPolicy::with_timeout_secs(10),
                stop_on_timeout: false,
            },
            &mut progress,
        )
        .expect("ask succeeds");

    let AskOutcome::Answered { task, record } = outcome else {
        panic!("expected an answer, got {outcome:?}");
    };
    assert_eq!(
        record,
        AnswerRecord {
            item_id: task.correlation_id.as_str().to_string(),
            context: "Paris is the capital of France.".to_string(),
            question: "What is the capital of France?".to_string(),
            answer: "Paris".to_string(),
            score: "0.98".to_string(),
        }
    );
    assert_eq!(record.score_value(), Some(0.98));
    assert_eq!(progress.statuses, statuses);
    assert_eq!(sleeper.naps(), 3);

    let polled = (config.cluster_name.clone(), task.run_id.clone());
    assert_eq!(backend.status_lookups(), vec![polled; 3]);
    assert_eq!(backend.launches()[0].cluster, config.cluster_name);
    assert_eq!(progress.submitted, Some(task.run_id));
}

#[test]
fn batch_submission_then_list_and_clear() {
    let deployment = TestDeployment::new();
    let backend = deployment.answering_backend("42", "0.5", &["STOPPED"]);
    let submitter = TaskSubmitter::new(&backend, &deployment.config);
    let problems: Vec<Problem> = (0..6)
        .map(|index| Problem {
            context: format!("The answer to question {index} is 42."),
            question: format!("What is the answer to question {index}?"),
        })
        .collect();

    let summary = submitter
        .submit_all(&problems, &mut |_| {})
        .expect("every submission accepted");
    assert_eq!(summary.submitted.len(), 6);
    assert_eq!(deployment.results.len(), 6);

    let first = &summary.submitted[0];
    let record = fetch(&deployment.results, &first.correlation_id)
        .expect("lookup succeeds")
        .expect("worker wrote the row");
    assert_eq!(record.question, "What is the answer to question 0?");

    assert_eq!(list_recent(&deployment.results, 4).expect("scan").len(), 4);
    assert_eq!(clear_all(&deployment.results).expect("clear"), 6);
    assert!(list_recent(&deployment.results, 50).expect("scan").is_empty());
    let cleared = fetch(&deployment.results, &first.correlation_id).expect("lookup succeeds");
    assert!(cleared.is_none());
}
