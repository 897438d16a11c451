use chrono::{DateTime, Utc};
use serde::Serialize;

/// An offerable gift. Created only through the admin API and immutable
/// afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Gift {
    pub fn new(name: String, description: String, image_url: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            image_url,
            created_at: Utc::now(),
        }
    }
}

/// A claim linking one user to one gift. The storage layer enforces at most
/// one row per `user_id`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftSelection {
    pub id: String,
    pub user_id: String,
    pub gift_id: String,
    pub created_at: DateTime<Utc>,
}

impl GiftSelection {
    pub fn new(user_id: String, gift_id: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            gift_id,
            created_at: Utc::now(),
        }
    }
}

/// Admin view of a claim, joined with the owning user's email and the
/// claimed gift's name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionWithDetails {
    pub id: String,
    pub user_id: String,
    pub gift_id: String,
    pub created_at: DateTime<Utc>,
    pub user_email: String,
    pub gift_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_gift_new() {
        let gift = Gift::new(
            "Headphones".to_string(),
            "Noise cancelling".to_string(),
            None,
        );
        assert!(Uuid::parse_str(&gift.id).is_ok());
        assert_eq!(gift.name, "Headphones");
        assert!(gift.image_url.is_none());
    }

    #[test]
    fn test_gift_serializes_camel_case() {
        let gift = Gift::new(
            "Headphones".to_string(),
            "Noise cancelling".to_string(),
            Some("https://example.com/hp.jpg".to_string()),
        );
        let json = serde_json::to_string(&gift).unwrap();
        assert!(json.contains(r#""imageUrl":"https://example.com/hp.jpg""#));
        assert!(json.contains(r#""createdAt":"#));
    }

    #[test]
    fn test_selection_new() {
        let selection = GiftSelection::new("sub-1".to_string(), "gift-1".to_string());
        assert!(Uuid::parse_str(&selection.id).is_ok());
        assert_eq!(selection.user_id, "sub-1");
        assert_eq!(selection.gift_id, "gift-1");
    }

    #[test]
    fn test_selection_ids_are_unique() {
        let a = GiftSelection::new("sub-1".to_string(), "gift-1".to_string());
        let b = GiftSelection::new("sub-1".to_string(), "gift-1".to_string());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_selection_with_details_serializes_camel_case() {
        let row = SelectionWithDetails {
            id: "sel-1".to_string(),
            user_id: "sub-1".to_string(),
            gift_id: "gift-1".to_string(),
            created_at: Utc::now(),
            user_email: "user1@example.com".to_string(),
            gift_name: "Headphones".to_string(),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains(r#""userEmail":"user1@example.com""#));
        assert!(json.contains(r#""giftName":"Headphones""#));
        assert!(json.contains(r#""userId":"sub-1""#));
    }
}
