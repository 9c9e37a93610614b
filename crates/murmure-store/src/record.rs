use serde::{Deserialize, Serialize};

use murmure_shared::types::UserId;

use crate::error::Result;

/// Persisted shape of one message entry:
/// `{ message: <base64 string>, senderId: <string> }`.
///
/// `message` is base64 of the IV-prefixed ciphertext. There is no
/// schema version field; any change here breaks all historical data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub message: String,
    pub sender_id: UserId,
}

impl MessageRecord {
    pub fn new(message: String, sender_id: UserId) -> Self {
        Self { message, sender_id }
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}
