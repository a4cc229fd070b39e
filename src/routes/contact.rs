/**
 * Contact Routes
 * Public contact form intake and the operators' message inbox
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::records::{ContactMessage, LeadStatus, NewContactMessage};
use crate::routes::{non_blank, require_email, CreatedResponse, ListResponse, SuccessResponse};
use crate::session::AdminSession;
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LeadStatusUpdate {
    pub status: LeadStatus,
}

/// POST /api/contact
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let new = NewContactMessage {
        name: non_blank(&form.name, "Name is required")?,
        email: require_email(&form.email)?,
        phone: form.phone.filter(|p| !p.trim().is_empty()),
        subject: form.subject.filter(|s| !s.trim().is_empty()),
        message: non_blank(&form.message, "Message is required")?,
    };

    let saved = state.records.insert_message(new).await?;
    tracing::info!(id = %saved.id, "contact message received");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            id: saved.id,
        }),
    ))
}

/// GET /api/admin/messages
pub async fn list_messages(
    _session: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<ListResponse<ContactMessage>>, ApiError> {
    let items = state.records.list_messages().await?;
    Ok(Json(ListResponse::new(items)))
}

/// PATCH /api/admin/messages/{id}
pub async fn update_message_status(
    AdminSession(claims): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<LeadStatusUpdate>,
) -> Result<Json<ContactMessage>, ApiError> {
    let updated = state
        .records
        .update_message_status(id, update.status)
        .await?;
    tracing::info!(id = %id, status = %update.status, by = %claims.email, "message status changed");
    Ok(Json(updated))
}

/// DELETE /api/admin/messages/{id}
pub async fn delete_message(
    AdminSession(claims): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.records.delete_message(id).await?;
    tracing::info!(id = %id, by = %claims.email, "message deleted");
    Ok(Json(SuccessResponse { success: true }))
}
