//! Wire types for the message-store HTTP API.
//!
//! Field names and casing follow the collaborator's contract per
//! endpoint: the `/api/msg` surface is flat, the `/api/group` surface is
//! camelCase, and the admin surfaces (`/api/group-defaults`, `/api/stats`,
//! `/api/store`) wrap their payloads in a `data` envelope.

use serde::{Deserialize, Serialize};

// =============================================================================
// MESSAGE API TYPES
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct AddMessageRequest {
    pub priority: i32,
    pub msg: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddMessageResponse {
    pub uuid: String,
}

/// One stored message as returned by `GET /api/msg`. A query that matches
/// nothing yields JSON `null` instead of this object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageData {
    pub uuid: String,
    pub msg: String,
}

/// Query parameters for `GET /api/msg`. All fields optional; with none
/// set the store serves its next message by its own selection policy.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MessageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,
}

impl MessageQuery {
    pub fn by_uuid(uuid: &str) -> Self {
        MessageQuery {
            uuid: Some(uuid.to_string()),
            ..MessageQuery::default()
        }
    }

    pub fn by_priority(priority: i32) -> Self {
        MessageQuery {
            priority: Some(priority),
            ..MessageQuery::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReprioritizeRequest {
    pub uuid: String,
    pub priority: i32,
}

// =============================================================================
// GROUP API TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMessage {
    pub uuid: String,
    pub byte_size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupReport {
    pub priority: i32,
    pub byte_size: u64,
    pub max_byte_size: Option<u64>,
    pub msg_count: u64,
    /// Populated only when the report was requested with
    /// `includeMsgData=true`.
    #[serde(default)]
    pub messages: Vec<GroupMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_msg_data: Option<bool>,
}

// =============================================================================
// ADMIN API TYPES
// =============================================================================

/// `data` envelope used by the group and admin surfaces.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDefaultsEntry {
    pub priority: i32,
    pub max_byte_size: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub inserted: u64,
    pub deleted: u64,
    pub pruned: u64,
}

/// Partial update for `PUT /api/stats`; unset fields are left untouched.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StatsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pruned: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreGroupData {
    pub priority: i32,
    pub byte_size: u64,
    pub max_byte_size: Option<u64>,
    pub msg_count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreReport {
    pub byte_size: u64,
    pub max_byte_size: Option<u64>,
    pub msg_count: u64,
    pub group_count: u64,
    pub groups: Vec<StoreGroupData>,
    pub group_defaults: Vec<GroupDefaultsEntry>,
}
