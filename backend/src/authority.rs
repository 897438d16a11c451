use crate::auth::Session;
use crate::models::User;
use crate::store::{GiftStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum AuthorityError {
    /// The session's user record no longer exists.
    #[error("No user record for session")]
    Unauthorized,
    #[error("Admin rights required")]
    Forbidden,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Loads the session's user record and asserts the admin flag.
///
/// Every privileged operation calls this itself; the result is not cached
/// across requests and path classification never substitutes for it.
pub fn require_admin(store: &GiftStore, session: &Session) -> Result<User, AuthorityError> {
    let user = store
        .find_user(&session.user_id)?
        .ok_or(AuthorityError::Unauthorized)?;

    if !user.is_admin {
        return Err(AuthorityError::Forbidden);
    }
    Ok(user)
}
