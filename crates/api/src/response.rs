//! Shared response envelope types for API handlers.
//!
//! Successful responses use a `{ "data": ... }` envelope. Use
//! [`DataResponse`] rather than ad-hoc `json!` so payloads stay typed.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// `T` may be an `Option`: an empty claim serializes as `{ "data": null }`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
