use std::fmt;
use std::time::Duration;

/// Why a cycle did not mint. The strings are stable and appear in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No HTTP response (timeout or transport error).
    Network,
    RateLimited,
    /// Moltbook answered 5xx.
    ServerError,
    /// Any other non-2xx status, or a 2xx without a body.
    ClientError,
    /// Bad inscription, missing API key, or a post without an id.
    Validation,
    VerificationFailed,
    Solver,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "moltbook_5xx",
            Self::ClientError => "client_error",
            Self::Validation => "validation",
            Self::VerificationFailed => "verification_failed",
            Self::Solver => "solver_failed",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleFailure {
    pub kind: FailureKind,
    /// HTTP status from publish, when one was received.
    pub status: Option<u16>,
    pub message: String,
}

impl CycleFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl fmt::Display for CycleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// A minted post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub post_id: String,
    /// A challenge was solved and accepted.
    pub verified: bool,
    /// The indexer accepted the post. Informational only.
    pub indexed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Success(MintReceipt),
    /// 429 from Moltbook, with the server's wait hint when it sent one.
    RateLimited { retry_after: Option<Duration> },
    Failed(CycleFailure),
}

impl CycleOutcome {
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success(_) => None,
            Self::RateLimited { .. } => Some(FailureKind::RateLimited),
            Self::Failed(failure) => Some(failure.kind),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
