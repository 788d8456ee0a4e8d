use thiserror::Error;

use crate::core::types::SlotId;

#[derive(Error, Debug)]
pub enum CourierError {
    #[error("Cannot add order {order_id}: {needed} weight would exceed capacity {max}")]
    CapacityExceeded {
        order_id: String,
        needed: f64,
        max: f64,
    },

    #[error("No order selected")]
    EmptySelection,

    #[error("Weather condition has no transition row: {0}")]
    UnknownCondition(String),

    #[error("Transition row for {0} has no positive weights")]
    InvalidTransitionRow(String),

    #[error("No save found in slot {0}")]
    SlotNotFound(SlotId),

    #[error("Fetch failed for {resource}: {reason}")]
    Fetch { resource: String, reason: String },

    #[error("Fetch timed out for {0}")]
    Timeout(String),

    #[error("No cached copy of {0}")]
    CacheMiss(String),

    #[error("Invalid map: {0}")]
    InvalidMap(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CourierError>;
