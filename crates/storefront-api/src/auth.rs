use tracing::info;

use storefront_db::models::UserRow;
use storefront_db::{Store, StoreConfig};
use storefront_types::api::{AuthResponse, LoginRequest, RegisterRequest, StatusResponse};
use storefront_types::envelope::{HandlerRequest, HandlerResponse};
use storefront_types::models::User;

use crate::action::AuthAction;
use crate::envelope;
use crate::error::{ApiError, FIELDS_REQUIRED};
use crate::password::{self, MIN_PASSWORD_LEN};
use crate::token;

pub const MIN_USERNAME_LEN: usize = 3;

const USERNAME_TOO_SHORT: &str = "Имя пользователя должно быть минимум 3 символа";
const PASSWORD_TOO_SHORT: &str = "Пароль должен быть минимум 6 символов";
const USER_EXISTS: &str = "Пользователь с таким именем или email уже существует";
const CREDENTIALS_REQUIRED: &str = "Введите имя пользователя и пароль";
const INVALID_CREDENTIALS: &str = "Неверное имя пользователя или пароль";
const TOKEN_MISSING: &str = "Токен не предоставлен";

const REGISTERED: &str = "Регистрация успешна";
const LOGGED_IN: &str = "Вход выполнен";
const TOKEN_VALID: &str = "Токен валиден";

/// Registers and authenticates users and hands out session tokens.
pub struct AuthHandler {
    store: Store,
}

impl AuthHandler {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            store: Store::new(config),
        }
    }

    pub fn handle(&self, req: &HandlerRequest) -> HandlerResponse {
        envelope::respond("auth", req, |action: AuthAction| match action {
            AuthAction::Register => self.register(req),
            AuthAction::Login => self.login(req),
            AuthAction::Verify => verify(req),
        })
    }

    fn register(&self, req: &HandlerRequest) -> Result<HandlerResponse, ApiError> {
        let body: RegisterRequest = req.json_body()?;

        let username = body.username.as_deref().unwrap_or_default().trim();
        let email = body.email.as_deref().unwrap_or_default().trim();
        let password = body.password.as_deref().unwrap_or_default();

        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(ApiError::Validation(FIELDS_REQUIRED));
        }
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(ApiError::Validation(USERNAME_TOO_SHORT));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::Validation(PASSWORD_TOO_SHORT));
        }

        let password_hash = password::digest(password);

        let mut session = self.store.session()?;
        let user = match session.insert_user(username, email, &password_hash) {
            Ok(user) => user,
            Err(e) if e.is_unique_violation() => {
                info!("Registration conflict for '{}'", username);
                return Err(ApiError::Conflict(USER_EXISTS));
            }
            Err(e) => return Err(e.into()),
        };

        info!("Registered user {} ('{}')", user.id, user.username);

        envelope::ok(&AuthResponse {
            success: true,
            message: REGISTERED.to_string(),
            user: public_user(user),
            token: token::issue(),
        })
    }

    fn login(&self, req: &HandlerRequest) -> Result<HandlerResponse, ApiError> {
        let body: LoginRequest = req.json_body()?;

        let username = body.username.as_deref().unwrap_or_default().trim();
        let password = body.password.as_deref().unwrap_or_default();

        if username.is_empty() || password.is_empty() {
            return Err(ApiError::Validation(CREDENTIALS_REQUIRED));
        }

        let password_hash = password::digest(password);

        let session = self.store.session()?;
        // Unknown user and wrong password are indistinguishable to the caller
        let user = session
            .find_user_by_credentials(username, &password_hash)?
            .ok_or(ApiError::Unauthorized(INVALID_CREDENTIALS))?;

        info!("User {} logged in", user.id);

        envelope::ok(&AuthResponse {
            success: true,
            message: LOGGED_IN.to_string(),
            user: public_user(user),
            token: token::issue(),
        })
    }
}

// FIXME: accepts any non-empty Authorization value. There is no token store to
// check against yet, so this only tells the caller a token was sent.
fn verify(req: &HandlerRequest) -> Result<HandlerResponse, ApiError> {
    token::presented(req).ok_or(ApiError::Unauthorized(TOKEN_MISSING))?;

    envelope::ok(&StatusResponse {
        success: true,
        message: TOKEN_VALID.to_string(),
    })
}

fn public_user(row: UserRow) -> User {
    User {
        id: row.id,
        username: row.username,
        email: row.email,
        created_at: row.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{post, temp_config};
    use serde_json::json;

    fn register(handler: &AuthHandler, username: &str, email: &str, password: &str) -> HandlerResponse {
        handler.handle(&post(
            "register",
            json!({ "username": username, "email": email, "password": password }),
        ))
    }

    fn login(handler: &AuthHandler, username: &str, password: &str) -> HandlerResponse {
        handler.handle(&post("login", json!({ "username": username, "password": password })))
    }

    #[test]
    fn register_returns_trimmed_user_and_token() {
        let (_dir, config) = temp_config();
        let handler = AuthHandler::new(config);

        let resp = register(&handler, "  anna  ", " anna@example.com ", "secret1");
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.header("Content-Type"), Some("application/json"));

        let body = resp.json().unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], REGISTERED);
        assert_eq!(body["user"]["username"], "anna");
        assert_eq!(body["user"]["email"], "anna@example.com");
        assert!(body["user"]["id"].as_i64().unwrap() > 0);
        assert!(body["user"].get("password_hash").is_none());
        assert!(body["token"].as_str().unwrap().len() >= 43);
    }

    #[test]
    fn register_requires_all_fields() {
        let (_dir, config) = temp_config();
        let handler = AuthHandler::new(config);

        let resp = handler.handle(&post("register", json!({ "username": "anna", "password": "secret1" })));
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.json().unwrap()["error"], FIELDS_REQUIRED);

        let resp = register(&handler, "   ", "a@example.com", "secret1");
        assert_eq!(resp.json().unwrap()["error"], FIELDS_REQUIRED);
    }

    #[test]
    fn register_enforces_length_boundaries() {
        let (_dir, config) = temp_config();
        let handler = AuthHandler::new(config);

        let resp = register(&handler, "ab", "ab@example.com", "secret1");
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.json().unwrap()["error"], USERNAME_TOO_SHORT);

        let resp = register(&handler, "anna", "anna@example.com", "12345");
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.json().unwrap()["error"], PASSWORD_TOO_SHORT);

        let resp = register(&handler, "anna", "anna@example.com", "123456");
        assert_eq!(resp.status_code, 200);
    }

    #[test]
    fn duplicate_registration_is_a_conflict() {
        let (_dir, config) = temp_config();
        let handler = AuthHandler::new(config);

        assert_eq!(register(&handler, "anna", "anna@example.com", "secret1").status_code, 200);

        let resp = register(&handler, "anna", "other@example.com", "secret2");
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.json().unwrap()["error"], USER_EXISTS);

        // The rejected attempt left nothing behind
        assert_eq!(login(&handler, "anna", "secret1").status_code, 200);
        assert_eq!(login(&handler, "anna", "secret2").status_code, 401);
    }

    #[test]
    fn login_failures_share_one_message() {
        let (_dir, config) = temp_config();
        let handler = AuthHandler::new(config);
        register(&handler, "anna", "anna@example.com", "secret1");

        let wrong_password = login(&handler, "anna", "secret2");
        let unknown_user = login(&handler, "boris", "secret1");

        assert_eq!(wrong_password.status_code, 401);
        assert_eq!(unknown_user.status_code, 401);
        assert_eq!(wrong_password.body, unknown_user.body);
        assert_eq!(wrong_password.json().unwrap()["error"], INVALID_CREDENTIALS);
    }

    #[test]
    fn login_issues_fresh_token() {
        let (_dir, config) = temp_config();
        let handler = AuthHandler::new(config);
        let registered = register(&handler, "anna", "anna@example.com", "secret1").json().unwrap();

        let resp = login(&handler, " anna ", "secret1");
        assert_eq!(resp.status_code, 200);

        let body = resp.json().unwrap();
        assert_eq!(body["message"], LOGGED_IN);
        assert_eq!(body["user"]["id"], registered["user"]["id"]);
        assert_ne!(body["token"], registered["token"]);
        assert!(body["token"].as_str().unwrap().len() >= 43);
    }

    #[test]
    fn login_requires_credentials() {
        let (_dir, config) = temp_config();
        let handler = AuthHandler::new(config);

        let resp = handler.handle(&post("login", json!({ "username": "anna" })));
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.json().unwrap()["error"], CREDENTIALS_REQUIRED);
    }

    #[test]
    fn verify_only_checks_presence() {
        let (_dir, config) = temp_config();
        let handler = AuthHandler::new(config);
        let verify = HandlerRequest::new("GET").with_query("action", "verify");

        let resp = handler.handle(&verify);
        assert_eq!(resp.status_code, 401);
        assert_eq!(resp.json().unwrap()["error"], TOKEN_MISSING);

        let resp = handler.handle(&verify.with_header("Authorization", "Bearer anything"));
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.json().unwrap()["message"], TOKEN_VALID);
    }

    #[test]
    fn verify_accepts_whitespace_token_but_not_empty() {
        let (_dir, config) = temp_config();
        let handler = AuthHandler::new(config);
        let verify = HandlerRequest::new("GET").with_query("action", "verify");

        let resp = handler.handle(&verify.clone().with_header("Authorization", "   "));
        assert_eq!(resp.status_code, 200);

        let resp = handler.handle(&verify.with_header("Authorization", ""));
        assert_eq!(resp.status_code, 401);
        assert_eq!(resp.json().unwrap()["error"], TOKEN_MISSING);
    }

    #[test]
    fn wrong_method_is_unknown_action() {
        let (_dir, config) = temp_config();
        let handler = AuthHandler::new(config);

        let resp = handler.handle(&HandlerRequest::new("GET").with_query("action", "register"));
        assert_eq!(resp.status_code, 400);
    }

    #[test]
    fn malformed_body_is_rejected() {
        let (_dir, config) = temp_config();
        let handler = AuthHandler::new(config);

        let req = HandlerRequest::new("POST")
            .with_query("action", "register")
            .with_body("{not json");
        let resp = handler.handle(&req);
        assert_eq!(resp.status_code, 400);
    }

    #[test]
    fn unreachable_store_is_a_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir").join("store.db");
        let handler = AuthHandler::new(StoreConfig::new(missing.to_string_lossy()));

        let resp = register(&handler, "anna", "anna@example.com", "secret1");
        assert_eq!(resp.status_code, 500);
        assert!(resp.json().unwrap()["error"].as_str().unwrap().starts_with("Ошибка сервера: "));
    }
}
