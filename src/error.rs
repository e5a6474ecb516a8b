use thiserror::Error;

/// 네트워크 계층에서 발생하는 오류.
/// 소스 경계를 넘어서 전파되지 않고 항상 `FetchOutcome`으로 변환된다.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("could not read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else if e.is_decode() || e.is_body() {
            FetchError::Body(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// 한 소스에 대한 한 번의 시도 결과.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    Success(T),
    NotFound,
    TransientError(String),
}

impl<T> FetchOutcome<T> {
    /// 네트워크 오류를 결과 값으로 낮춘다. 404는 "없음"으로, 나머지는 일시적 오류로 본다.
    pub fn from_error(err: FetchError) -> Self {
        match err {
            FetchError::Status(404) => FetchOutcome::NotFound,
            other => FetchOutcome::TransientError(other.to_string()),
        }
    }

    #[cfg(test)]
    pub fn success(self) -> Option<T> {
        match self {
            FetchOutcome::Success(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status_maps_to_not_found() {
        let outcome: FetchOutcome<()> = FetchOutcome::from_error(FetchError::Status(404));
        assert!(matches!(outcome, FetchOutcome::NotFound));
    }

    #[test]
    fn test_other_errors_are_transient() {
        let outcome: FetchOutcome<()> = FetchOutcome::from_error(FetchError::Status(503));
        match outcome {
            FetchOutcome::TransientError(reason) => assert!(reason.contains("503")),
            other => panic!("unexpected outcome: {:?}", other),
        }

        let outcome: FetchOutcome<()> = FetchOutcome::from_error(FetchError::Timeout);
        assert!(matches!(outcome, FetchOutcome::TransientError(_)));
    }
}
