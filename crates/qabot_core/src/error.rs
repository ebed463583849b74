use thiserror::Error;

/// Outcome of the sibling-key enumeration attached to a missing parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterListing {
    Available(Vec<String>),
    Unavailable(String),
}

impl ParameterListing {
    pub fn names(&self) -> &[String] {
        match self {
            Self::Available(names) => names,
            Self::Unavailable(_) => &[],
        }
    }
}

#[derive(Debug, Error)]
pub enum QaBotError {
    #[error("parameter {name} not found in parameter store")]
    ConfigurationNotFound {
        name: String,
        diagnostic: ParameterListing,
    },

    #[error("failed to read parameter {name}: {message}")]
    ConfigurationUnavailable { name: String, message: String },

    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("task submission rejected: {0}")]
    Submission(String),

    #[error("execution backend error: {0}")]
    Backend(String),

    #[error("result store error: {0}")]
    Store(String),

    #[error("failed to load problems: {0}")]
    Problems(String),

    #[error("{failed} submissions rejected ({submitted} accepted); first error: {first_error}")]
    BatchSubmission {
        submitted: usize,
        failed: usize,
        first_error: String,
    },
}
