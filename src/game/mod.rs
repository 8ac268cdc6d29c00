//! Game rules as pure functions over the player's stats record.
//!
//! Nothing in here touches storage or the network; routes load the record,
//! call into these modules, and save the result.

pub mod campaign;
pub mod question;
pub mod route;
pub mod scoring;
pub mod stats;
