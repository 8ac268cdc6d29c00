//! Cloud backup configuration, passed in by the page at startup.

use serde::Deserialize;

pub const DEFAULT_TABLE: &str = "player_progress";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`. Empty disables sync.
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub table: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl SyncConfig {
    /// Parse the page's config JSON. An empty string means "no cloud backup".
    pub fn from_json(json: &str) -> Result<Self, String> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(|e| format!("Invalid config JSON: {}", e))
    }

    pub fn is_enabled(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    /// PostgREST endpoint for the stats table.
    pub fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.supabase_url.trim_end_matches('/'),
            self.table
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_disables_sync() {
        let config = SyncConfig::from_json("").unwrap();
        assert!(!config.is_enabled());
        assert_eq!(config.table, "player_progress");
    }

    #[test]
    fn table_defaults_when_omitted() {
        let config = SyncConfig::from_json(
            r#"{"supabase_url":"https://x.supabase.co/","supabase_anon_key":"k"}"#,
        )
        .unwrap();
        assert!(config.is_enabled());
        assert_eq!(config.table_url(), "https://x.supabase.co/rest/v1/player_progress");
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(SyncConfig::from_json("{").is_err());
    }
}
