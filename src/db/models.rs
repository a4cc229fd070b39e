//! Database Models - rows of the lead-tracking tables and their domain forms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Triage state of a contact message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Read,
    Replied,
}

/// Triage state of a service request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceRequestStatus {
    Pending,
    InReview,
    Approved,
    Rejected,
    Completed,
}

impl LeadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Read => "read",
            LeadStatus::Replied => "replied",
        }
    }
}

impl ServiceRequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceRequestStatus::Pending => "pending",
            ServiceRequestStatus::InReview => "in_review",
            ServiceRequestStatus::Approved => "approved",
            ServiceRequestStatus::Rejected => "rejected",
            ServiceRequestStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ServiceRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(LeadStatus::New),
            "read" => Ok(LeadStatus::Read),
            "replied" => Ok(LeadStatus::Replied),
            other => Err(format!("unknown lead status `{other}`")),
        }
    }
}

impl FromStr for ServiceRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ServiceRequestStatus::Pending),
            "in_review" => Ok(ServiceRequestStatus::InReview),
            "approved" => Ok(ServiceRequestStatus::Approved),
            "rejected" => Ok(ServiceRequestStatus::Rejected),
            "completed" => Ok(ServiceRequestStatus::Completed),
            other => Err(format!("unknown service request status `{other}`")),
        }
    }
}

/// Contact message submitted from the public site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New contact message for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

/// Service request submitted from the public site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub service: String,
    pub details: Option<String>,
    pub status: ServiceRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New service request for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub service: String,
    pub details: Option<String>,
}

/// `contact_messages` row; status is stored as text
#[derive(Debug, Clone, FromRow)]
pub struct ContactMessageRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `service_requests` row; status is stored as text
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRequestRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub service: String,
    pub details: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ContactMessageRow> for ContactMessage {
    type Error = String;

    fn try_from(row: ContactMessageRow) -> Result<Self, Self::Error> {
        Ok(ContactMessage {
            status: row.status.parse()?,
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            subject: row.subject,
            message: row.message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<ServiceRequestRow> for ServiceRequest {
    type Error = String;

    fn try_from(row: ServiceRequestRow) -> Result<Self, Self::Error> {
        Ok(ServiceRequest {
            status: row.status.parse()?,
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            service: row.service,
            details: row.details,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
