use std::time::Duration;

/// Coarse classification of a [DiscoveryErr], without the attached detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ConnectionFailed,
    Timeout,
    ProtocolViolation,
    ResolutionFailed,
}

/// Uniform error definition for a status probe.
#[derive(Debug)]
pub enum DiscoveryErr {
    /// Socket level failures: refused, unreachable, DNS failure while connecting.
    ConnectionFailed(std::io::Error),
    /// No complete frame arrived within the configured budget.
    Timeout(Duration),
    /// Malformed varint, truncated string, unexpected packet id, bad JSON or
    /// missing required fields.
    ProtocolViolation(String),
    /// Hostname lookup failure in the address helpers.
    ResolutionFailed(String),
}

impl DiscoveryErr {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DiscoveryErr::ConnectionFailed(_) => ErrorKind::ConnectionFailed,
            DiscoveryErr::Timeout(_) => ErrorKind::Timeout,
            DiscoveryErr::ProtocolViolation(_) => ErrorKind::ProtocolViolation,
            DiscoveryErr::ResolutionFailed(_) => ErrorKind::ResolutionFailed,
        }
    }

    /// Whether the failure means the remote could not be reached at all,
    /// as opposed to answering with something that is not a status response.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ConnectionFailed | ErrorKind::Timeout
        )
    }

    /// Map an I/O error raised on an established connection.
    ///
    /// Socket read/write timeouts surface as `WouldBlock` on Unix and
    /// `TimedOut` on Windows, both are reported as [DiscoveryErr::Timeout].
    pub(crate) fn from_stream_io(err: std::io::Error, budget: Duration) -> Self {
        match err.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
                DiscoveryErr::Timeout(budget)
            }
            _ => DiscoveryErr::ConnectionFailed(err),
        }
    }
}

impl std::fmt::Display for DiscoveryErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryErr::ConnectionFailed(err) => write!(f, "Connection failed: {}", err),
            DiscoveryErr::Timeout(budget) => write!(
                f,
                "No complete status response within {}ms",
                budget.as_millis()
            ),
            DiscoveryErr::ProtocolViolation(str) => write!(f, "Protocol violation: {}", str),
            DiscoveryErr::ResolutionFailed(str) => write!(f, "{}", str),
        }
    }
}

impl std::error::Error for DiscoveryErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiscoveryErr::ConnectionFailed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DiscoveryErr {
    fn from(err: std::io::Error) -> Self {
        DiscoveryErr::ConnectionFailed(err)
    }
}

impl From<serde_json::Error> for DiscoveryErr {
    fn from(err: serde_json::Error) -> Self {
        DiscoveryErr::ProtocolViolation(format!("Invalid status JSON: {}", err))
    }
}

impl From<std::str::Utf8Error> for DiscoveryErr {
    fn from(err: std::str::Utf8Error) -> Self {
        DiscoveryErr::ProtocolViolation(format!("Invalid UTF-8 string: {}", err))
    }
}
