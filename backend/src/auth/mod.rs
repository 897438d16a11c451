//! Cookie-based session resolution.
//!
//! This module provides:
//! - Request-cookie parsing and Set-Cookie construction
//! - HS256 access/refresh token verification and re-issuance
//! - The per-request `SessionState` consumed by the access gate

pub mod cookies;
pub mod tokens;

pub use tokens::{AuthError, Resolution, Session, SessionState, TokenPair, TokenService};
