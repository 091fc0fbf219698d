//! Shared response envelope types for API handlers.
//!
//! Collection reads use a `{ "data": ... }` envelope. Mutations answer with
//! the message types shared with the client in `bizdir_gateway`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
