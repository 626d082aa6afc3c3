use serde::{Deserialize, Serialize};

use crate::models::{Comment, User};

// -- Auth --

/// Fields are optional so that a missing or `null` field reaches validation
/// instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
    pub token: String,
}

// -- Comments --

/// Product identifiers arrive as either JSON strings or numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Text(String),
    Number(i64),
}

impl ProductRef {
    /// Normalised store key; `None` when blank.
    pub fn key(&self) -> Option<String> {
        match self {
            Self::Text(raw) => {
                let trimmed = raw.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::Number(n) => Some(n.to_string()),
        }
    }
}

/// User ids arrive as either JSON integers or numeric strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(i64),
    Text(String),
}

impl UserRef {
    /// Positive integer id, or `None` if it is not one.
    pub fn id(&self) -> Option<i64> {
        let id = match self {
            Self::Id(id) => *id,
            Self::Text(raw) => raw.trim().parse().ok()?,
        };
        (id > 0).then_some(id)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AddCommentRequest {
    #[serde(default)]
    pub product_id: Option<ProductRef>,
    #[serde(default)]
    pub user_id: Option<UserRef>,
    #[serde(default)]
    pub comment_text: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub success: bool,
    pub message: String,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub success: bool,
    pub message: String,
    pub comment: Comment,
}

// -- Shared --

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_comment_accepts_both_id_shapes() {
        let req: AddCommentRequest = serde_json::from_value(json!({
            "product_id": 17,
            "user_id": "42",
            "comment_text": "Отлично",
            "rating": null
        }))
        .unwrap();

        assert_eq!(req.product_id.and_then(|p| p.key()), Some("17".to_string()));
        assert_eq!(req.user_id.and_then(|u| u.id()), Some(42));
        assert_eq!(req.rating, None);
    }

    #[test]
    fn blank_refs_are_rejected() {
        assert_eq!(ProductRef::Text("   ".into()).key(), None);
        assert_eq!(UserRef::Text("abc".into()).id(), None);
        assert_eq!(UserRef::Id(0).id(), None);
    }
}
