mod handshake;
mod regular_server;
mod response;

pub use handshake::*;
pub use regular_server::*;
pub use response::*;
use serde::{Deserialize, Serialize};

/// Result of one successful status probe.
///
/// Built fresh for every probe and never mutated by the crate afterwards.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    /// Host as supplied by the caller, not necessarily resolved.
    pub address: String,
    pub port: u16,
    /// Version label reported by the server, e.g. `1.20.1`. Not interpreted.
    pub protocol_version_name: String,
    /// Protocol number reported next to the version label, if any.
    pub protocol_version: Option<i64>,
    /// Raw description text, `§` formatting codes included.
    pub motd: String,
    pub max_players: i64,
    pub online_players: i64,
    /// Players listed by the server, empty when it reports none.
    pub player_sample: Vec<PlayerSample>,
    /// Server icon as a base64 data URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Milliseconds between sending the handshake and completing the response frame.
    pub latency_ms: u64,
}

impl ServerStatus {
    /// The MOTD with legacy `§` + character formatting codes removed.
    ///
    /// Display helper only, [ServerStatus::motd] keeps the raw text.
    pub fn plain_motd(&self) -> String {
        strip_formatting_codes(&self.motd)
    }
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            serde_json::to_string_pretty(self).map_err(|_| std::fmt::Error)?
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlayerSample {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
}

/// Remove `§` followed by any character.
pub fn strip_formatting_codes(str: &str) -> String {
    let mut result = String::with_capacity(str.len());
    let mut chars = str.chars();

    while let Some(c) = chars.next() {
        if c == '§' {
            chars.next();
            continue;
        }

        result.push(c);
    }

    result
}
