//! Contact form messages and the store's published contact details.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::fields;
use crate::db::Document;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    New,
    Read,
    Replied,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::New => "new",
            MessageStatus::Read => "read",
            MessageStatus::Replied => "replied",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "new" => Some(MessageStatus::New),
            "read" => Some(MessageStatus::Read),
            "replied" => Some(MessageStatus::Replied),
            _ => None,
        }
    }
}

/// Stored body of a contact message document.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessageRecord {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub status: MessageStatus,
}

impl ContactMessageRecord {
    /// Read a stored message body; numbers are accepted where text is
    /// expected and an unknown status reads as `new`.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let text = |key: &str| fields::loose_text(map, key).unwrap_or_default();
        ContactMessageRecord {
            name: text("name"),
            email: text("email"),
            phone: fields::loose_text(map, "phone"),
            subject: text("subject"),
            message: text("message"),
            status: fields::text(map, "status")
                .and_then(|s| MessageStatus::parse(&s))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,
    #[serde(flatten)]
    pub record: ContactMessageRecord,
    pub created_at: String,
    pub updated_at: String,
    pub version: i64,
}

impl ContactMessage {
    pub fn from_document(doc: &Document) -> Self {
        ContactMessage {
            id: doc.id.clone(),
            record: ContactMessageRecord::from_map(&doc.data),
            created_at: doc.created_at.clone(),
            updated_at: doc.updated_at.clone(),
            version: doc.version,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactMessageRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMessageStatusRequest {
    pub status: MessageStatus,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Published phone, chat, mail and address of the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub phone: &'static str,
    pub whatsapp: &'static str,
    pub email: &'static str,
    pub address: &'static str,
    pub hours: OpeningHours,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    pub weekdays: &'static str,
    pub saturday: &'static str,
    pub sunday: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    pub platform: &'static str,
    pub url: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<&'static str>,
}

/// Everything the contact page shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub info: ContactInfo,
    pub social_links: Vec<SocialLink>,
}
