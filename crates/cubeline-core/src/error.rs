//! Error types for fetching, building and validating dimension models
//!
//! Every variant is fatal to the run that produced it. Nothing in this crate
//! retries: callers wrap these errors with context and stop.

/// Failure while talking to a remote collection endpoint.
#[derive(Debug)]
pub enum FetchError {
    /// Connection, DNS or TLS failure before a response arrived
    Transport { operation: String, message: String },
    /// Server answered with a status other than the one the operation expects
    Status {
        operation: String,
        expected: u16,
        actual: u16,
        body: String,
    },
    /// Response body could not be decoded
    Decode { operation: String, message: String },
    /// First page of a paged fetch did not report a total count
    MissingCount { operation: String },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport { operation, message } => {
                write!(f, "{operation}: transport error: {message}")
            }
            Self::Status {
                operation,
                expected,
                actual,
                body,
            } => write!(
                f,
                "{operation}: expected HTTP {expected}, server responded with HTTP {actual}: {body}"
            ),
            Self::Decode { operation, message } => {
                write!(f, "{operation}: malformed response: {message}")
            }
            Self::MissingCount { operation } => {
                write!(f, "{operation}: first page did not report a total count")
            }
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// Create transport error from reqwest error
    pub fn from_reqwest(operation: &str, e: &reqwest::Error) -> Self {
        Self::Transport {
            operation: operation.to_string(),
            message: e.to_string(),
        }
    }

    pub fn decode(operation: &str, e: impl std::fmt::Display) -> Self {
        Self::Decode {
            operation: operation.to_string(),
            message: e.to_string(),
        }
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { actual, .. } => Some(*actual),
            _ => None,
        }
    }
}

/// A record could not be placed into the hierarchy being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A level that may not be skipped produced an empty identifier
    EmptyLevel {
        hierarchy: String,
        level: String,
        record: usize,
    },
    /// The leaf level produced an empty identifier
    EmptyLeaf { hierarchy: String, record: usize },
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLevel {
                hierarchy,
                level,
                record,
            } => write!(
                f,
                "hierarchy '{hierarchy}': record #{record} has no identifier for required level '{level}'"
            ),
            Self::EmptyLeaf { hierarchy, record } => write!(
                f,
                "hierarchy '{hierarchy}': record #{record} has no leaf identifier"
            ),
        }
    }
}

impl std::error::Error for BuildError {}

/// A finished hierarchy violates the model invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Same identifier appended twice (usually unsorted or unqualified input)
    DuplicateElement { hierarchy: String, element: String },
    /// Edge references an element that was not appended before it
    DanglingEdge {
        hierarchy: String,
        parent: String,
        child: String,
    },
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateElement { hierarchy, element } => write!(
                f,
                "hierarchy '{hierarchy}': element '{element}' appears more than once \
                 (input not sorted by level path, or identifier not qualified)"
            ),
            Self::DanglingEdge {
                hierarchy,
                parent,
                child,
            } => write!(
                f,
                "hierarchy '{hierarchy}': edge '{parent}' -> '{child}' references an unknown element"
            ),
        }
    }
}

impl std::error::Error for ModelError {}
