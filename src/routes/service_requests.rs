/**
 * Service Request Routes
 * Public "request a service" intake and the operators' review queue
 */
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::records::{NewServiceRequest, ServiceRequest, ServiceRequestStatus};
use crate::routes::{non_blank, require_email, CreatedResponse, ListResponse, SuccessResponse};
use crate::session::AdminSession;
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    pub service: String,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceRequestQuery {
    pub status: Option<ServiceRequestStatus>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ServiceRequestStatusUpdate {
    pub status: ServiceRequestStatus,
}

/// POST /api/service-requests
pub async fn submit_service_request(
    State(state): State<AppState>,
    Json(form): Json<ServiceRequestForm>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let new = NewServiceRequest {
        name: non_blank(&form.name, "Name is required")?,
        email: require_email(&form.email)?,
        phone: form.phone.filter(|p| !p.trim().is_empty()),
        company: form.company.filter(|c| !c.trim().is_empty()),
        service: non_blank(&form.service, "Service is required")?,
        details: form.details.filter(|d| !d.trim().is_empty()),
    };

    let saved = state.records.insert_service_request(new).await?;
    tracing::info!(id = %saved.id, service = %saved.service, "service request received");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            id: saved.id,
        }),
    ))
}

/// GET /api/admin/service-requests?status=...
pub async fn list_service_requests(
    _session: AdminSession,
    State(state): State<AppState>,
    Query(query): Query<ServiceRequestQuery>,
) -> Result<Json<ListResponse<ServiceRequest>>, ApiError> {
    let items = state.records.list_service_requests(query.status).await?;
    Ok(Json(ListResponse::new(items)))
}

/// PATCH /api/admin/service-requests/{id}
pub async fn update_service_request_status(
    AdminSession(claims): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<ServiceRequestStatusUpdate>,
) -> Result<Json<ServiceRequest>, ApiError> {
    let updated = state
        .records
        .update_service_request_status(id, update.status)
        .await?;
    tracing::info!(id = %id, status = %update.status, by = %claims.email, "service request status changed");
    Ok(Json(updated))
}

/// DELETE /api/admin/service-requests/{id}
pub async fn delete_service_request(
    AdminSession(claims): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.records.delete_service_request(id).await?;
    tracing::info!(id = %id, by = %claims.email, "service request deleted");
    Ok(Json(SuccessResponse { success: true }))
}
