use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    ContactMessage, LeadStatus, NewContactMessage, NewServiceRequest, RecordError, RecordStore,
    ServiceRequest, ServiceRequestStatus,
};

/// Process-local record store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    messages: RwLock<HashMap<Uuid, ContactMessage>>,
    requests: RwLock<HashMap<Uuid, ServiceRequest>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert_message(&self, new: NewContactMessage) -> Result<ContactMessage, RecordError> {
        let now = Utc::now();
        let message = ContactMessage {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            subject: new.subject,
            message: new.message,
            status: LeadStatus::New,
            created_at: now,
            updated_at: now,
        };
        self.messages
            .write()
            .await
            .insert(message.id, message.clone());
        Ok(message)
    }

    async fn list_messages(&self) -> Result<Vec<ContactMessage>, RecordError> {
        let mut items: Vec<_> = self.messages.read().await.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn update_message_status(
        &self,
        id: Uuid,
        status: LeadStatus,
    ) -> Result<ContactMessage, RecordError> {
        let mut messages = self.messages.write().await;
        let message = messages.get_mut(&id).ok_or(RecordError::NotFound(id))?;
        message.status = status;
        message.updated_at = Utc::now();
        Ok(message.clone())
    }

    async fn delete_message(&self, id: Uuid) -> Result<(), RecordError> {
        self.messages
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RecordError::NotFound(id))
    }

    async fn insert_service_request(
        &self,
        new: NewServiceRequest,
    ) -> Result<ServiceRequest, RecordError> {
        let now = Utc::now();
        let request = ServiceRequest {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            company: new.company,
            service: new.service,
            details: new.details,
            status: ServiceRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.requests
            .write()
            .await
            .insert(request.id, request.clone());
        Ok(request)
    }

    async fn list_service_requests(
        &self,
        status: Option<ServiceRequestStatus>,
    ) -> Result<Vec<ServiceRequest>, RecordError> {
        let mut items: Vec<_> = self
            .requests
            .read()
            .await
            .values()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn update_service_request_status(
        &self,
        id: Uuid,
        status: ServiceRequestStatus,
    ) -> Result<ServiceRequest, RecordError> {
        let mut requests = self.requests.write().await;
        let request = requests.get_mut(&id).ok_or(RecordError::NotFound(id))?;
        request.status = status;
        request.updated_at = Utc::now();
        Ok(request.clone())
    }

    async fn delete_service_request(&self, id: Uuid) -> Result<(), RecordError> {
        self.requests
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RecordError::NotFound(id))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
