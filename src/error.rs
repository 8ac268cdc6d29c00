//! Error types shared by the game rules, the local store and remote sync.
//!
//! Configuration errors (`GameError`) are meant to be prevented by the page
//! before a call is made; they fail fast. `SyncError` never reaches the page
//! from a background push (see `sync::push`).

use thiserror::Error;

/// Invalid input to the game rules, or a store failure while applying them.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Invalid leg ID: {0}")]
    InvalidLeg(String),

    #[error("Leg {0} is still locked")]
    LockedLeg(String),

    #[error("Invalid waypoint index {0} (expected 0-4)")]
    InvalidWaypoint(u8),

    #[error("Select at least one times table")]
    NoTablesSelected,

    #[error("Times table {0} is out of range (expected 1-100)")]
    InvalidTable(u32),

    #[error("Max multiplier must be between 1 and 100")]
    InvalidMultiplier,

    #[error("A round needs between 1 and 100 questions")]
    InvalidRoundSize,

    #[error("Not enough facts left to draw {0} random questions")]
    EmptyPool(usize),

    #[error("Invalid round submission: {0}")]
    InvalidSubmission(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Local persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Local storage is unavailable")]
    Unavailable,

    #[error("Storage error: {0}")]
    Backend(String),

    #[error("Could not encode player stats: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid backup: {0}")]
    Backup(String),
}

/// Remote store failures. Logged and dropped by background pushes.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Cloud backup is not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Could not decode remote record: {0}")]
    Decode(String),
}
