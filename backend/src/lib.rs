pub mod auth;
pub mod authority;
pub mod config;
pub mod gate;
pub mod logging;
pub mod models;
pub mod policy;
pub mod routes;
pub mod store;
pub mod test_util;

pub use auth::{Resolution, Session, SessionState, TokenPair, TokenService};
pub use config::Config;
pub use models::{Gift, GiftSelection, SelectionWithDetails, User};
pub use policy::{Outcome, PathPolicy, PolicyClass};
pub use store::{GiftStore, StoreError};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub tokens: TokenService,
    pub store: GiftStore,
    pub policy: PathPolicy,
}
