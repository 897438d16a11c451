pub mod sqlite;

pub use sqlite::{GiftStore, StoreError};
