pub mod gift;
pub mod user;

pub use gift::{Gift, GiftSelection, SelectionWithDetails};
pub use user::User;
