//! Lead and service-request records.
//!
//! The site only needs insert / list / status update / delete over two record
//! kinds, so the store is a narrow trait with a Postgres implementation and an
//! in-memory one for database-less runs and tests. No status transition graph
//! is enforced; operators may move a record to any status.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use uuid::Uuid;

pub use crate::db::models::{
    ContactMessage, LeadStatus, NewContactMessage, NewServiceRequest, ServiceRequest,
    ServiceRequestStatus,
};
pub use memory::MemoryRecordStore;
pub use pg::PgRecordStore;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("record {0} not found")]
    NotFound(Uuid),

    #[error("record database query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_message(&self, new: NewContactMessage) -> Result<ContactMessage, RecordError>;

    /// Newest first.
    async fn list_messages(&self) -> Result<Vec<ContactMessage>, RecordError>;

    async fn update_message_status(
        &self,
        id: Uuid,
        status: LeadStatus,
    ) -> Result<ContactMessage, RecordError>;

    async fn delete_message(&self, id: Uuid) -> Result<(), RecordError>;

    async fn insert_service_request(
        &self,
        new: NewServiceRequest,
    ) -> Result<ServiceRequest, RecordError>;

    /// Newest first, optionally only those in `status`.
    async fn list_service_requests(
        &self,
        status: Option<ServiceRequestStatus>,
    ) -> Result<Vec<ServiceRequest>, RecordError>;

    async fn update_service_request_status(
        &self,
        id: Uuid,
        status: ServiceRequestStatus,
    ) -> Result<ServiceRequest, RecordError>;

    async fn delete_service_request(&self, id: Uuid) -> Result<(), RecordError>;

    fn backend_name(&self) -> &'static str;
}
