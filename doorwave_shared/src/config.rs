//! Configuration system.
//!
//! Loads client configuration from JSON strings/files (file IO left to app).

use serde::{Deserialize, Serialize};

/// Root client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server address, e.g. `127.0.0.1:40000`.
    pub server_addr: String,
    /// Predict/render tick rate.
    pub tick_hz: u32,
    /// Display name sent on room join.
    #[serde(default = "default_player_name")]
    pub player_name: String,
    /// Room code to join on startup, if any.
    #[serde(default)]
    pub room_code: Option<String>,
}

fn default_player_name() -> String {
    "Player".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:40000".to_string(),
            tick_hz: 60,
            player_name: default_player_name(),
            room_code: None,
        }
    }
}

impl ClientConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg = ClientConfig::from_json_str(
            r#"{"server_addr":"127.0.0.1:1234","tick_hz":30}"#,
        )
        .unwrap();
        assert_eq!(cfg.player_name, "Player");
        assert_eq!(cfg.room_code, None);
        assert_eq!(cfg.tick_hz, 30);
    }
}
