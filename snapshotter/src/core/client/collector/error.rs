use thiserror::Error;
use tonic::{Code, Status};

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Invalid collector endpoint {endpoint}: {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    /// Connection refused or reset, HTTP/2 protocol violation, call aborted by the collector
    #[error("Collector transport failure ({code:?}): {message}")]
    Transport { code: Code, message: String },

    #[error("Collector closed the stream without an acknowledgement")]
    StreamClosed,

    #[error("Collector rejected the submission ({code:?}): {message}")]
    Rejected { code: Code, message: String },
}

impl CollectorError {
    pub fn from_status(status: Status) -> Self {
        let message = status.message().to_string();
        match status.code() {
            code @ (Code::Unavailable
            | Code::Unknown
            | Code::Internal
            | Code::Aborted
            | Code::DataLoss
            | Code::Cancelled
            | Code::DeadlineExceeded) => CollectorError::Transport { code, message },
            code => CollectorError::Rejected { code, message },
        }
    }

    /// The stream this error came from can not be used again
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, CollectorError::Transport { .. } | CollectorError::StreamClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case(Code::Unavailable)]
    #[case(Code::Internal)]
    #[case(Code::Unknown)]
    #[case(Code::Aborted)]
    #[case(Code::Cancelled)]
    #[case(Code::DeadlineExceeded)]
    fn test_transport_codes_are_connection_failures(#[case] code: Code) {
        let err = CollectorError::from_status(Status::new(code, "connection reset"));
        assert_matches!(err, CollectorError::Transport { code: c, .. } if c == code);
        assert!(err.is_connection_failure());
    }

    #[test]
    fn test_other_codes_are_rejections() {
        let err = CollectorError::from_status(Status::invalid_argument("bad signature"));
        assert_matches!(err, CollectorError::Rejected { code: Code::InvalidArgument, .. });
        assert!(!err.is_connection_failure());
    }
}
