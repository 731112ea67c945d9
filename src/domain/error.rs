//! Domain error types.

/// Why a single user-entered `(ticker, value)` pair was refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HoldingRejection {
    #[error("ticker is empty")]
    EmptyTicker,

    #[error("value {input:?} is not a finite number")]
    InvalidValue { input: String },
}

/// What went wrong with one field of an analysis response.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Problem {
    #[error("missing")]
    Missing,

    #[error("expected an object")]
    NotObject,

    #[error("expected an array")]
    NotArray,

    #[error("expected a number")]
    NotNumber,

    #[error("element {index} is not a number")]
    NotNumberAt { index: usize },

    #[error("length mismatch ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
}

/// A validation failure located by its dotted field path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{path}: {problem}")]
pub struct FieldError {
    pub path: String,
    pub problem: Problem,
}

impl FieldError {
    pub fn new(path: impl Into<String>, problem: Problem) -> Self {
        Self {
            path: path.into(),
            problem,
        }
    }
}

/// Top-level error type for portlens.
#[derive(Debug, thiserror::Error)]
pub enum PortlensError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("holdings file {path}: {reason}")]
    HoldingsFile { path: String, reason: String },

    #[error("portfolio has no holdings")]
    EmptyPortfolio,

    #[error("portfolio holdings sum to zero")]
    ZeroTotalValue,

    #[error("request failed: {reason}")]
    Transport { reason: String },

    #[error("{detail}")]
    Service { status: u16, detail: String },

    #[error("invalid data structure received from server ({} field(s) failed)", .reasons.len())]
    InvalidResponse { reasons: Vec<FieldError> },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PortlensError> for std::process::ExitCode {
    fn from(err: &PortlensError) -> Self {
        let code: u8 = match err {
            PortlensError::Io(_) => 1,
            PortlensError::ConfigParse { .. } | PortlensError::ConfigInvalid { .. } => 2,
            PortlensError::HoldingsFile { .. }
            | PortlensError::EmptyPortfolio
            | PortlensError::ZeroTotalValue => 3,
            PortlensError::Transport { .. } | PortlensError::Service { .. } => 4,
            PortlensError::InvalidResponse { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
