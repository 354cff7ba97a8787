use super::{handshake::STATUS_PACKET_ID, PlayerSample, ServerStatus};
use crate::{mc_string::decode_string, varint::decode_varint, DiscoveryErr};
use serde::Deserialize;

/// Decoded status response payload, before the caller merges in the probed
/// address, port and measured latency.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusResponse {
    pub protocol_version_name: String,
    pub protocol_version: Option<i64>,
    pub motd: String,
    pub max_players: i64,
    pub online_players: i64,
    pub player_sample: Vec<PlayerSample>,
    pub favicon: Option<String>,
}

impl StatusResponse {
    pub fn into_server_status(self, address: &str, port: u16, latency_ms: u64) -> ServerStatus {
        ServerStatus {
            address: address.into(),
            port,
            protocol_version_name: self.protocol_version_name,
            protocol_version: self.protocol_version,
            motd: self.motd,
            max_players: self.max_players,
            online_players: self.online_players,
            player_sample: self.player_sample,
            favicon: self.favicon,
            latency_ms,
        }
    }
}

// Servers attach plenty of extra keys (forgeData, modinfo, enforcesSecureChat...),
// so unknown fields are ignored rather than denied.
#[derive(Deserialize, Debug)]
struct RawStatus {
    version: RawVersion,
    players: RawPlayers,
    #[serde(default)]
    description: Option<Description>,
    #[serde(default)]
    favicon: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawVersion {
    name: String,
    #[serde(default)]
    protocol: Option<i64>,
}

#[derive(Deserialize, Debug)]
struct RawPlayers {
    max: i64,
    online: i64,
    #[serde(default)]
    sample: Option<Vec<PlayerSample>>,
}

/// Server description, either a plain string or a chat component.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Description {
    Text(String),
    Component {
        #[serde(default)]
        text: String,
        #[serde(default)]
        extra: Vec<Description>,
    },
    Other(serde_json::Value),
}

impl Description {
    /// Concatenate `text` and the `extra` children depth first.
    fn flatten_into(&self, out: &mut String) {
        match self {
            Description::Text(text) => out.push_str(text),
            Description::Component { text, extra } => {
                out.push_str(text);

                for child in extra {
                    child.flatten_into(out);
                }
            }
            Description::Other(_) => {}
        }
    }
}

/// Parse a status response frame payload (the bytes after the length prefix).
///
/// The payload is `[VarInt packet id = 0x00][VarInt json length][UTF-8 JSON]`.
/// Player counts are trusted as reported, no bounds are enforced.
pub fn parse_status_response(payload: &[u8]) -> Result<StatusResponse, DiscoveryErr> {
    let (packet_id, id_len) = decode_varint(payload, 0)?;

    if packet_id != STATUS_PACKET_ID {
        return Err(DiscoveryErr::ProtocolViolation(format!(
            "Expected status response packet id 0x{:02X}, but got 0x{:02X}",
            STATUS_PACKET_ID, packet_id
        )));
    }

    let (json, _) = decode_string(payload, id_len)?;
    let raw = serde_json::from_str::<RawStatus>(&json)?;
    let mut motd = String::new();

    if let Some(description) = &raw.description {
        description.flatten_into(&mut motd);
    }

    Ok(StatusResponse {
        protocol_version_name: raw.version.name,
        protocol_version: raw.version.protocol,
        motd,
        max_players: raw.players.max,
        online_players: raw.players.online,
        player_sample: raw.players.sample.unwrap_or_default(),
        favicon: raw.favicon,
    })
}
