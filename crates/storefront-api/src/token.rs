use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

use storefront_types::envelope::HandlerRequest;

/// Random bytes behind each session token.
pub const TOKEN_BYTES: usize = 32;

/// Opaque URL-safe session token. Tokens are handed to the caller and not
/// stored anywhere.
pub fn issue() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Non-empty `Authorization` header value, if any. Presence is all that is
/// checked; the value itself, whitespace included, is not inspected.
pub fn presented(req: &HandlerRequest) -> Option<&str> {
    req.header("Authorization").filter(|value| !value.is_empty())
}
