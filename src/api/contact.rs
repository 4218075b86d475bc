//! Contact page and contact message endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{error, required_text, success, ApiResult};
use crate::contact;
use crate::db::Collection;
use crate::errors::AppError;
use crate::models::{
    ContactDetails, ContactMessage, ContactMessageRecord, CreateContactMessageRequest,
    MessageStatus, UpdateMessageStatusRequest,
};
use crate::whatsapp::{self, ChatHandoff};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(default)]
    pub status: Option<MessageStatus>,
}

/// A stored contact message and the chat hand-off announcing it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedMessage {
    pub message: ContactMessage,
    pub whatsapp: ChatHandoff,
}

/// GET /api/contact - Store contact details and social links.
pub async fn get_contact_details(State(state): State<AppState>) -> ApiResult<ContactDetails> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(contact::contact_details(), revision_id)
}

fn validate_message(
    request: CreateContactMessageRequest,
) -> Result<ContactMessageRecord, AppError> {
    let required = |value: Option<&str>, field: &str| {
        required_text(value).ok_or_else(|| AppError::Validation(format!("{} is required", field)))
    };
    Ok(ContactMessageRecord {
        name: required(request.name.as_deref(), "Name")?,
        email: required(request.email.as_deref(), "Email")?,
        phone: required_text(request.phone.as_deref()),
        subject: required(request.subject.as_deref(), "Subject")?,
        message: required(request.message.as_deref(), "Message")?,
        status: MessageStatus::New,
    })
}

/// POST /api/contact-messages - Submit the contact form.
pub async fn create_contact_message(
    State(state): State<AppState>,
    Json(request): Json<CreateContactMessageRequest>,
) -> ApiResult<CreatedMessage> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let record = match validate_message(request) {
        Ok(record) => record,
        Err(e) => return error(e, revision_id),
    };
    let body = match serde_json::to_value(&record) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => return error(e.into(), revision_id),
    };

    let id = contact::generate_message_id();
    match state
        .repo
        .insert_document(Collection::Messages, Some(&id), body)
        .await
    {
        Ok(doc) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            let message = ContactMessage {
                id: doc.id,
                record,
                created_at: doc.created_at,
                updated_at: doc.updated_at,
                version: doc.version,
            };
            // The store's published number stands in for an unset admin number
            let number = state
                .config
                .admin_whatsapp
                .as_deref()
                .unwrap_or(contact::STORE_WHATSAPP);
            let handoff =
                ChatHandoff::to_number(whatsapp::contact_message(&message), Some(number));
            tracing::info!(id = %message.id, "contact message received");
            success(
                CreatedMessage {
                    message,
                    whatsapp: handoff,
                },
                new_revision,
            )
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/admin/messages - List contact messages, newest first.
pub async fn list_messages(
    State(state): State<AppState>,
    Query(params): Query<MessageQuery>,
) -> ApiResult<Vec<ContactMessage>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_messages(params.status).await {
        Ok(messages) => success(messages, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/admin/messages/{id} - Get a single contact message.
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ContactMessage> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_message(&id).await {
        Ok(Some(message)) => success(message, revision_id),
        Ok(None) => error(AppError::not_found("Message", &id), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/admin/messages/{id}/status - Mark a message read or replied.
pub async fn update_message_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateMessageStatusRequest>,
) -> ApiResult<ContactMessage> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let mut changes = Map::new();
    changes.insert("status".into(), json!(request.status.as_str()));

    let merged = state
        .repo
        .merge_document(Collection::Messages, &id, &changes, request.expected_version)
        .await;
    match merged.map(|doc| ContactMessage::from_document(&doc)) {
        Ok(message) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(message, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/admin/messages/{id} - Delete a contact message.
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_document(Collection::Messages, &id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
