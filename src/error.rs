use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GomodError {
    #[error("{0}")]
    Io(String),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("format go.mod: {0}")]
    Format(String),

    #[error("ui failed: {0}")]
    Selection(String),

    #[error("run {0}")]
    Update(String),

    #[error("no direct dependencies found")]
    NoDirectDependencies,

    #[error("no modules selected")]
    NoModulesSelected,

    #[error("could not update {target:?}: {source}")]
    Target {
        target: String,
        #[source]
        source: Box<GomodError>,
    },

    #[error("{}", join_lines(.0))]
    Batch(Vec<GomodError>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GomodError {
    /// Wrap an I/O failure with the operation that produced it.
    pub fn io(context: impl fmt::Display, err: std::io::Error) -> Self {
        GomodError::Io(format!("{context}: {err}"))
    }

    /// Attach the identity of the target whose pipeline failed.
    pub fn for_target(target: impl Into<String>, err: GomodError) -> Self {
        GomodError::Target {
            target: target.into(),
            source: Box::new(err),
        }
    }

    /// Collapse per-target failures into one value, or `None` when nothing failed.
    pub fn join(errors: Vec<GomodError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            _ => Some(GomodError::Batch(errors)),
        }
    }

    /// Individual failures in reporting order; a batch yields its members.
    pub fn causes(&self) -> Vec<&GomodError> {
        match self {
            GomodError::Batch(errors) => errors.iter().flat_map(|e| e.causes()).collect(),
            other => vec![other],
        }
    }
}

fn join_lines(errors: &[GomodError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Grammar violation in a manifest, located by file name and line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{file}:{line}: {message}")]
pub struct ParseError {
    pub file: String,
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GomodError>;
