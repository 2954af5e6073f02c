use std::fmt;

/// Errors raised while constructing an [`Interpreter`](crate::Interpreter).
///
/// None of these leave any state behind: construction either succeeds with a
/// validated program or nothing runs at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A `[` has no matching `]`. Reports the most recently opened one still pending.
    #[error("Unmatched bracket {} at instruction {position}", BracketKind::Open)]
    UnmatchedOpen { position: usize },

    /// A `]` appeared with no pending `[`.
    #[error("Unmatched bracket {} at instruction {position}", BracketKind::Close)]
    UnmatchedClose { position: usize },

    /// The requested tape has no cells.
    #[error("Invalid tape length: {len} (must be at least 1)")]
    InvalidTapeLength { len: usize },
}

impl BuildError {
    /// Source position the error points at, if any.
    pub fn position(&self) -> Option<usize> {
        match self {
            BuildError::UnmatchedOpen { position } | BuildError::UnmatchedClose { position } => {
                Some(*position)
            }
            BuildError::InvalidTapeLength { .. } => None,
        }
    }
}

/// Which side of a loop was left unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Open,
    Close,
}

impl fmt::Display for BracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketKind::Open => write!(f, "'['"),
            BracketKind::Close => write!(f, "']'"),
        }
    }
}

/// Errors that stop a run partway through.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// `,` executed with no input left.
    #[error("Input exhausted at instruction {ip}")]
    InputExhausted { ip: usize },

    /// The input source failed while `,` was reading from it.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },

    /// The caller's instruction budget ran out.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: u64 },

    /// The caller raised the cancel flag (timeout, ctrl+c).
    #[error("Execution aborted: cancelled")]
    Canceled,
}

impl RuntimeError {
    /// Source position of the failing instruction, for errors tied to one.
    pub fn position(&self) -> Option<usize> {
        match self {
            RuntimeError::InputExhausted { ip } | RuntimeError::Io { ip, .. } => Some(*ip),
            RuntimeError::StepLimitExceeded { .. } | RuntimeError::Canceled => None,
        }
    }
}

/// A run that stopped early, together with everything it printed before stopping.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct Aborted {
    #[source]
    pub error: RuntimeError,
    pub output: Vec<u8>,
}
