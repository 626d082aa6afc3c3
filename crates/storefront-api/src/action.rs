use std::fmt::Debug;

use storefront_types::envelope::HttpMethod;

/// The set of operations a handler routes to, keyed by the `action` query
/// parameter together with the HTTP method.
pub trait Action: Copy + Debug + Sized {
    /// `None` is the unknown-action case.
    fn resolve(name: &str, method: &HttpMethod) -> Option<Self>;

    fn name(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Register,
    Login,
    Verify,
}

impl Action for AuthAction {
    fn resolve(name: &str, method: &HttpMethod) -> Option<Self> {
        match (name, method) {
            ("register", HttpMethod::Post) => Some(Self::Register),
            ("login", HttpMethod::Post) => Some(Self::Login),
            ("verify", HttpMethod::Get) => Some(Self::Verify),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::Verify => "verify",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    List,
    Add,
}

impl Action for CommentAction {
    fn resolve(name: &str, method: &HttpMethod) -> Option<Self> {
        match (name, method) {
            ("get", HttpMethod::Get) => Some(Self::List),
            ("add", HttpMethod::Post) => Some(Self::Add),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::List => "get",
            Self::Add => "add",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_requires_matching_method() {
        assert_eq!(AuthAction::resolve("register", &HttpMethod::Post), Some(AuthAction::Register));
        assert_eq!(AuthAction::resolve("register", &HttpMethod::Get), None);
        assert_eq!(AuthAction::resolve("verify", &HttpMethod::Get), Some(AuthAction::Verify));
        assert_eq!(AuthAction::resolve("verify", &HttpMethod::Post), None);

        assert_eq!(CommentAction::resolve("get", &HttpMethod::Get), Some(CommentAction::List));
        assert_eq!(CommentAction::resolve("add", &HttpMethod::Get), None);
        assert_eq!(
            CommentAction::resolve("add", &HttpMethod::Other("PUT".into())),
            None
        );
    }

    #[test]
    fn names_round_trip() {
        for action in [AuthAction::Register, AuthAction::Login] {
            assert_eq!(AuthAction::resolve(action.name(), &HttpMethod::Post), Some(action));
        }
        assert_eq!(CommentAction::resolve(CommentAction::Add.name(), &HttpMethod::Post), Some(CommentAction::Add));
    }

    #[test]
    fn action_names_are_case_sensitive() {
        assert_eq!(AuthAction::resolve("LOGIN", &HttpMethod::Post), None);
        assert_eq!(AuthAction::resolve("", &HttpMethod::Post), None);
    }
}
