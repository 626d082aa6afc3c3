use storefront_db::StoreError;
use thiserror::Error;

pub const FIELDS_REQUIRED: &str = "Все поля обязательны";
pub const UNKNOWN_ACTION: &str = "Неверное действие";
pub const MALFORMED_BODY: &str = "Некорректный JSON в теле запроса";
pub const INVALID_FIELD_TYPE: &str = "Неверный тип поля в теле запроса";

/// Every way a handler invocation can fail. Each variant maps to one status
/// code and its message is what the caller sees in `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed or out-of-range input, or an unknown action.
    #[error("{0}")]
    Validation(&'static str),
    /// Credential mismatch or missing token.
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    /// Store rejected a write on a uniqueness constraint.
    #[error("{0}")]
    Conflict(&'static str),
    #[error("Ошибка сервера: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Conflict(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            Self::Internal(_) => 500,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Well-formed JSON with a field of the wrong type is reported apart from
/// broken JSON.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            Self::Validation(INVALID_FIELD_TYPE)
        } else {
            Self::Validation(MALFORMED_BODY)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(ApiError::Validation(FIELDS_REQUIRED).status(), 400);
        assert_eq!(ApiError::Conflict("dup").status(), 400);
        assert_eq!(ApiError::Unauthorized("no").status(), 401);
        assert_eq!(ApiError::NotFound("gone").status(), 404);
        assert_eq!(ApiError::Internal("disk I/O error".into()).status(), 500);
    }

    #[test]
    fn body_errors_separate_syntax_from_types() {
        let syntax = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert_eq!(ApiError::from(syntax).to_string(), MALFORMED_BODY);

        let wrong_type = serde_json::from_str::<Option<i64>>("4.0").unwrap_err();
        let err = ApiError::from(wrong_type);
        assert_eq!(err.status(), 400);
        assert_eq!(err.to_string(), INVALID_FIELD_TYPE);
    }

    #[test]
    fn internal_message_carries_diagnostic() {
        let err = ApiError::Internal("database is locked".into());
        assert_eq!(err.to_string(), "Ошибка сервера: database is locked");
    }
}
