//! Route handlers. Each handler reads the stats record through the injected
//! `Store`, applies the game rules, and returns a JSON or HTML body.

pub mod campaign;
pub mod player;
pub mod round;
pub mod util;

use rand::Rng;

use crate::game::stats::PlayerStats;
use crate::store::{Storage, Store};

/// Everything a handler may touch: the local store, a random source, and
/// the current time in milliseconds.
pub struct Env<'a, S: Storage, G: Rng> {
    pub store: &'a Store<S>,
    pub rng: &'a mut G,
    pub now_ms: i64,
}

/// A handler's response body, plus the saved record to back up remotely
/// (if the handler changed it).
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub body: String,
    pub push: Option<PlayerStats>,
}

impl Outcome {
    pub fn body(body: String) -> Self {
        Self { body, push: None }
    }

    pub fn with_push(body: String, stats: PlayerStats) -> Self {
        Self {
            body,
            push: Some(stats),
        }
    }
}

impl From<String> for Outcome {
    fn from(body: String) -> Self {
        Self::body(body)
    }
}
