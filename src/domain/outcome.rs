use std::time::Duration;

/// Terminal classification of a failed request. Failures are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    Timeout,
    ConnectionError,
    ClientError,
    Unexpected,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Timeout => "Timeout",
            ErrorKind::ConnectionError => "Connection Error",
            ErrorKind::ClientError => "Client Error",
            ErrorKind::Unexpected => "Unexpected Error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Any response status, including 4xx and 5xx.
    Success { status_code: u16, latency: Duration },
    Failure {
        error_kind: ErrorKind,
        latency: Duration,
    },
}

/// Result of one attempted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOutcome {
    pub outcome: Outcome,
}

impl RequestOutcome {
    #[must_use]
    pub fn success(status_code: u16, latency: Duration) -> Self {
        Self {
            outcome: Outcome::Success {
                status_code,
                latency,
            },
        }
    }

    #[must_use]
    pub fn failure(error_kind: ErrorKind, latency: Duration) -> Self {
        Self {
            outcome: Outcome::Failure {
                error_kind,
                latency,
            },
        }
    }

    /// Time until the response status arrived, or until the request failed.
    #[must_use]
    pub const fn latency(&self) -> Duration {
        match self.outcome {
            Outcome::Success { latency, .. } | Outcome::Failure { latency, .. } => latency,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }
}
