use std::fmt;

use bytes::Bytes;

use super::InputSource;

const MISSING_QUERY_BODY: &str = r#"{"error":"missing IP query parameter, try ?ip=foo"}"#;
const MISSING_PATH_BODY: &str = r#"{"error":"missing IP address in path, try /8.8.8.8"}"#;
const INVALID_BODY: &str = r#"{"error":"could not parse invalid IP address"}"#;
const ENCODE_FAILURE_BODY: &str = r#"{"error":"internal encoding failure"}"#;

/// 请求路径上的错误
///
/// 只在 HTTP 边界处被渲染为状态码和 JSON 响应体，不向上传播。
#[derive(Debug, Clone, PartialEq)]
pub enum LookupError {
    MissingInput,
    InvalidInput,
    LookupFailed(String),
    EncodeFailure(String),
}

impl LookupError {
    pub fn status_code(&self) -> u16 {
        match self {
            LookupError::MissingInput | LookupError::InvalidInput => 400,
            LookupError::LookupFailed(_) | LookupError::EncodeFailure(_) => 500,
        }
    }

    /// 渲染错误响应体 `{"error":"..."}`
    pub fn to_json(&self, input: InputSource) -> Bytes {
        match self {
            LookupError::MissingInput => match input {
                InputSource::Query => Bytes::from_static(MISSING_QUERY_BODY.as_bytes()),
                InputSource::Path => Bytes::from_static(MISSING_PATH_BODY.as_bytes()),
            },
            LookupError::InvalidInput => Bytes::from_static(INVALID_BODY.as_bytes()),
            LookupError::LookupFailed(msg) => {
                serde_json::to_vec(&serde_json::json!({ "error": msg }))
                    .map(Bytes::from)
                    .unwrap_or_else(|_| Bytes::from_static(ENCODE_FAILURE_BODY.as_bytes()))
            }
            // 不暴露内部细节
            LookupError::EncodeFailure(_) => Bytes::from_static(ENCODE_FAILURE_BODY.as_bytes()),
        }
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::MissingInput => write!(f, "missing IP address"),
            LookupError::InvalidInput => write!(f, "could not parse invalid IP address"),
            LookupError::LookupFailed(msg) => write!(f, "lookup failed: {}", msg),
            LookupError::EncodeFailure(msg) => write!(f, "encode failure: {}", msg),
        }
    }
}

impl std::error::Error for LookupError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(LookupError::MissingInput.status_code(), 400);
        assert_eq!(LookupError::InvalidInput.status_code(), 400);
        assert_eq!(LookupError::LookupFailed("x".into()).status_code(), 500);
        assert_eq!(LookupError::EncodeFailure("x".into()).status_code(), 500);
    }

    #[test]
    fn test_missing_body_depends_on_input_source() {
        assert_eq!(
            &LookupError::MissingInput.to_json(InputSource::Query)[..],
            MISSING_QUERY_BODY.as_bytes()
        );
        assert_eq!(
            &LookupError::MissingInput.to_json(InputSource::Path)[..],
            MISSING_PATH_BODY.as_bytes()
        );
    }

    #[test]
    fn test_lookup_failed_message_is_escaped() {
        let err = LookupError::LookupFailed(r#"bad "record" at \x"#.to_string());
        assert_eq!(
            &err.to_json(InputSource::Query)[..],
            br#"{"error":"bad \"record\" at \\x"}"#
        );
    }

    #[test]
    fn test_encode_failure_hides_details() {
        let err = LookupError::EncodeFailure("float overflow in writer".to_string());
        assert_eq!(
            &err.to_json(InputSource::Query)[..],
            ENCODE_FAILURE_BODY.as_bytes()
        );
    }
}
