use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    ContactMessage, LeadStatus, NewContactMessage, NewServiceRequest, RecordError, RecordStore,
    ServiceRequest, ServiceRequestStatus,
};
use crate::db::models::{ContactMessageRow, ServiceRequestRow};

const MESSAGE_COLUMNS: &str =
    "id, name, email, phone, subject, message, status, created_at, updated_at";
const REQUEST_COLUMNS: &str =
    "id, name, email, phone, company, service, details, status, created_at, updated_at";

/// Record store over the `contact_messages` and `service_requests` tables.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: Arc<PgPool>,
}

impl PgRecordStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn message(row: ContactMessageRow) -> Result<ContactMessage, RecordError> {
    ContactMessage::try_from(row).map_err(RecordError::Corrupt)
}

fn request(row: ServiceRequestRow) -> Result<ServiceRequest, RecordError> {
    ServiceRequest::try_from(row).map_err(RecordError::Corrupt)
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert_message(&self, new: NewContactMessage) -> Result<ContactMessage, RecordError> {
        let row = sqlx::query_as::<_, ContactMessageRow>(&format!(
            r#"
            INSERT INTO contact_messages (name, email, phone, subject, message, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.subject)
        .bind(&new.message)
        .bind(LeadStatus::New.as_str())
        .fetch_one(self.pool.as_ref())
        .await?;
        message(row)
    }

    async fn list_messages(&self) -> Result<Vec<ContactMessage>, RecordError> {
        sqlx::query_as::<_, ContactMessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM contact_messages ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool.as_ref())
        .await?
        .into_iter()
        .map(message)
        .collect()
    }

    async fn update_message_status(
        &self,
        id: Uuid,
        status: LeadStatus,
    ) -> Result<ContactMessage, RecordError> {
        let row = sqlx::query_as::<_, ContactMessageRow>(&format!(
            r#"
            UPDATE contact_messages SET status = $1, updated_at = now()
            WHERE id = $2
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(RecordError::NotFound(id))?;
        message(row)
    }

    async fn delete_message(&self, id: Uuid) -> Result<(), RecordError> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(RecordError::NotFound(id));
        }
        Ok(())
    }

    async fn insert_service_request(
        &self,
        new: NewServiceRequest,
    ) -> Result<ServiceRequest, RecordError> {
        let row = sqlx::query_as::<_, ServiceRequestRow>(&format!(
            r#"
            INSERT INTO service_requests (name, email, phone, company, service, details, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.company)
        .bind(&new.service)
        .bind(&new.details)
        .bind(ServiceRequestStatus::Pending.as_str())
        .fetch_one(self.pool.as_ref())
        .await?;
        request(row)
    }

    async fn list_service_requests(
        &self,
        status: Option<ServiceRequestStatus>,
    ) -> Result<Vec<ServiceRequest>, RecordError> {
        sqlx::query_as::<_, ServiceRequestRow>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS} FROM service_requests
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.pool.as_ref())
        .await?
        .into_iter()
        .map(request)
        .collect()
    }

    async fn update_service_request_status(
        &self,
        id: Uuid,
        status: ServiceRequestStatus,
    ) -> Result<ServiceRequest, RecordError> {
        let row = sqlx::query_as::<_, ServiceRequestRow>(&format!(
            r#"
            UPDATE service_requests SET status = $1, updated_at = now()
            WHERE id = $2
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(RecordError::NotFound(id))?;
        request(row)
    }

    async fn delete_service_request(&self, id: Uuid) -> Result<(), RecordError> {
        let result = sqlx::query("DELETE FROM service_requests WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(RecordError::NotFound(id));
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
