//! Storefront shared types.
//!
//! `envelope` is the runtime-facing request/response shape both handlers speak.
//! `api` holds the per-action payloads, `models` the objects returned to callers.

pub mod api;
pub mod envelope;
pub mod models;
