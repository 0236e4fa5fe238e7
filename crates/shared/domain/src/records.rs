//! Row shapes for the tables the dashboard reads and writes.

use crate::evidence::Verdict;
use crate::roles::{AdminRole, ResponderType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A string that is not one of an enum's allowed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid {}", self.value, self.kind)
    }
}

impl std::error::Error for UnknownValue {}

string_enum! {
    pub enum ReportStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Resolved => "resolved",
        Rejected => "rejected",
    }
}

string_enum! {
    pub enum EmergencyStatus {
        Active => "active",
        Responding => "responding",
        Resolved => "resolved",
        Cancelled => "cancelled",
    }
}

string_enum! {
    pub enum AnnouncementPriority {
        Low => "low",
        Normal => "normal",
        High => "high",
        Urgent => "urgent",
    }
}

string_enum! {
    pub enum AccountType {
        Resident => "resident",
        Responder => "responder",
    }
}

string_enum! {
    pub enum VerificationStatus {
        Pending => "pending",
        Verified => "verified",
        Rejected => "rejected",
    }
}

string_enum! {
    pub enum ResponderStatus {
        Available => "available",
        Busy => "busy",
        Offline => "offline",
    }
}

impl Default for AnnouncementPriority {
    fn default() -> Self {
        Self::Normal
    }
}

/// A citizen incident report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Report {
    pub id: String,
    #[serde(default)]
    pub reporter_id: Option<String>,
    pub category: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub status: ReportStatus,
    #[serde(default)]
    pub responder_notes: Option<String>,
    #[serde(default)]
    pub media_urls: Vec<String>,
    #[serde(default)]
    pub evidence_verdict: Option<Verdict>,
    #[serde(default)]
    pub evidence_score: Option<f64>,
    #[serde(default)]
    pub evidence_explanation: Option<String>,
    #[serde(default)]
    pub evidence_checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An emergency alert raised by a resident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Emergency {
    pub id: String,
    #[serde(default)]
    pub reporter_id: Option<String>,
    pub emergency_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub status: EmergencyStatus,
    #[serde(default)]
    pub responder_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub priority: AnnouncementPriority,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub author_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row of the `users` table: residents and responder-linked logins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserAccount {
    pub id: String,
    #[serde(default)]
    pub auth_id: Option<String>,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub account_type: AccountType,
    pub verification_status: VerificationStatus,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdminUser {
    pub id: String,
    pub auth_id: String,
    pub full_name: String,
    pub email: String,
    pub role: AdminRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Responder {
    pub id: String,
    pub user_id: String,
    pub auth_id: String,
    pub full_name: String,
    pub email: String,
    pub responder_type: ResponderType,
    pub status: ResponderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuditLog {
    pub id: String,
    #[serde(default)]
    pub actor_id: Option<String>,
    #[serde(default)]
    pub actor_email: Option<String>,
    pub action: String,
    pub entity: String,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

const fn default_true() -> bool {
    true
}
