use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of `POST /chat/api/rooms/{room_id}/read-status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadStatusRequest {
    pub message_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadStatusResponse {
    /// Keyed by message id (sent as JSON object keys)
    #[serde(default)]
    pub read_statuses: BTreeMap<i64, ReadStatus>,
}

impl ReadStatusResponse {
    pub fn marks(&self) -> BTreeMap<i64, ReadMark> {
        self.read_statuses
            .iter()
            .map(|(id, status)| (*id, status.mark()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadStatus {
    #[serde(default)]
    pub read_count: u32,
    /// Room members other than the sender; 0 or missing counts as 1
    #[serde(default)]
    pub total_members: u32,
}

impl ReadStatus {
    pub fn mark(&self) -> ReadMark {
        let total = if self.total_members == 0 { 1 } else { self.total_members };

        if self.read_count >= total - 1 {
            ReadMark::AllRead
        } else if self.read_count > 0 {
            ReadMark::PartiallyRead {
                readers: self.read_count,
            }
        } else {
            ReadMark::Unread
        }
    }
}

/// Delivery indicator shown next to one of the user's own messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mark", rename_all = "snake_case")]
pub enum ReadMark {
    AllRead,
    PartiallyRead { readers: u32 },
    Unread,
}
