use tracing::{error, info};

use storefront_db::{Store, StoreConfig};
use storefront_types::api::{AddCommentRequest, CommentListResponse, CommentResponse, ProductRef, UserRef};
use storefront_types::envelope::{HandlerRequest, HandlerResponse};
use storefront_types::models::Comment;

use crate::action::CommentAction;
use crate::envelope;
use crate::error::{ApiError, FIELDS_REQUIRED};

pub const RATING_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

const PRODUCT_ID_MISSING: &str = "Не указан product_id";
const RATING_OUT_OF_RANGE: &str = "Рейтинг должен быть от 1 до 5";
const USER_NOT_FOUND: &str = "Пользователь не найден";

const COMMENTS_LOADED: &str = "Комментарии загружены";
const COMMENT_ADDED: &str = "Комментарий добавлен";

/// Lists and creates product comments.
pub struct CommentHandler {
    store: Store,
}

impl CommentHandler {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            store: Store::new(config),
        }
    }

    pub fn handle(&self, req: &HandlerRequest) -> HandlerResponse {
        envelope::respond("comments", req, |action: CommentAction| match action {
            CommentAction::List => self.list(req),
            CommentAction::Add => self.add(req),
        })
    }

    fn list(&self, req: &HandlerRequest) -> Result<HandlerResponse, ApiError> {
        let product_id = req
            .query("product_id")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ApiError::Validation(PRODUCT_ID_MISSING))?;

        let session = self.store.session()?;
        let comments: Vec<Comment> = session
            .comments_for_product(product_id)?
            .into_iter()
            .map(|row| Comment {
                id: row.id,
                text: row.comment_text,
                rating: row.rating,
                created_at: row.created_at,
                username: row.username,
            })
            .collect();

        envelope::ok(&CommentListResponse {
            success: true,
            message: COMMENTS_LOADED.to_string(),
            comments,
        })
    }

    fn add(&self, req: &HandlerRequest) -> Result<HandlerResponse, ApiError> {
        let body: AddCommentRequest = req.json_body()?;

        let product_id = body.product_id.as_ref().and_then(ProductRef::key);
        let user_id = body.user_id.as_ref().and_then(UserRef::id);
        let text = body.comment_text.as_deref().unwrap_or_default().trim();

        let (Some(product_id), Some(user_id)) = (product_id, user_id) else {
            return Err(ApiError::Validation(FIELDS_REQUIRED));
        };
        if text.is_empty() {
            return Err(ApiError::Validation(FIELDS_REQUIRED));
        }
        if let Some(rating) = body.rating {
            if !RATING_RANGE.contains(&rating) {
                return Err(ApiError::Validation(RATING_OUT_OF_RANGE));
            }
        }

        let mut session = self.store.session()?;
        if !session.user_exists(user_id)? {
            return Err(ApiError::NotFound(USER_NOT_FOUND));
        }

        let row = session.insert_comment(&product_id, user_id, text, body.rating)?;

        let username = session.username_by_id(user_id)?.ok_or_else(|| {
            error!("User {} vanished after commenting", user_id);
            ApiError::Internal(format!("user {} not found after insert", user_id))
        })?;

        info!("Comment {} added to product '{}' by user {}", row.id, row.product_id, row.user_id);

        envelope::ok(&CommentResponse {
            success: true,
            message: COMMENT_ADDED.to_string(),
            comment: Comment {
                id: row.id,
                text: row.comment_text,
                rating: row.rating,
                created_at: row.created_at,
                username,
            },
        })
    }
}
