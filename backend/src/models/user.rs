use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// User record mirroring an identity-provider account.
///
/// `id` is the provider's subject id; the two systems share the same
/// identifier so a session can be matched to a row without any mapping
/// table. Rows are provisioned out-of-band, never by request handlers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    /// Birthday driving the countdown, when the profile has one.
    pub birthday: Option<NaiveDate>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "sub-1".to_string(),
            email: "user1@example.com".to_string(),
            birthday: Some(NaiveDate::from_ymd_opt(1990, 10, 20).unwrap()),
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(json.contains(r#""isAdmin":false"#));
        assert!(json.contains(r#""createdAt":"#));
        assert!(json.contains(r#""birthday":"1990-10-20""#));
    }

    #[test]
    fn test_user_without_birthday_serializes_null() {
        let mut user = sample_user();
        user.birthday = None;
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains(r#""birthday":null"#));
    }
}
