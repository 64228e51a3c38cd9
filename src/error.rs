use std::fmt;

/// Failure raised while probing the message store.
///
/// Every variant aborts the scenario that raised it. The suite runner
/// records the failure and moves on to the next scenario; nothing is
/// retried.
#[derive(Debug)]
pub enum ProbeError {
    Transport {
        operation: String,
        source: reqwest::Error,
    },
    UnexpectedStatus {
        operation: String,
        status: u16,
        body: String,
    },
    MalformedResponse {
        operation: String,
        detail: String,
    },
    Assertion {
        check: String,
        expected: String,
        actual: String,
    },
}

impl ProbeError {
    pub fn transport(operation: &str, source: reqwest::Error) -> Self {
        ProbeError::Transport {
            operation: operation.to_string(),
            source,
        }
    }

    pub fn unexpected_status(operation: &str, status: u16, body: String) -> Self {
        ProbeError::UnexpectedStatus {
            operation: operation.to_string(),
            status,
            body,
        }
    }

    pub fn malformed_response(operation: &str, detail: impl fmt::Display) -> Self {
        ProbeError::MalformedResponse {
            operation: operation.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn assertion(check: &str, expected: impl fmt::Display, actual: impl fmt::Display) -> Self {
        ProbeError::Assertion {
            check: check.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ProbeError::Transport { .. })
    }

    pub fn is_unexpected_status(&self) -> bool {
        matches!(self, ProbeError::UnexpectedStatus { .. })
    }

    pub fn is_assertion(&self) -> bool {
        matches!(self, ProbeError::Assertion { .. })
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Transport { operation, source } => {
                write!(f, "transport error during {operation}: {source}")
            }
            ProbeError::UnexpectedStatus {
                operation,
                status,
                body,
            } => {
                if body.is_empty() {
                    write!(f, "{operation} returned HTTP {status}")
                } else {
                    write!(f, "{operation} returned HTTP {status}: {}", body.trim())
                }
            }
            ProbeError::MalformedResponse { operation, detail } => {
                write!(f, "malformed response from {operation}: {detail}")
            }
            ProbeError::Assertion {
                check,
                expected,
                actual,
            } => {
                write!(f, "{check}: expected {expected}, got {actual}")
            }
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::Transport { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failure reading or parsing the probe configuration file.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: String,
        source: std::io::Error,
    },
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "could not read config '{path}': {source}")
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid JSON config '{path}': {source}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}
