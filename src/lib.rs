//! Discover the status of a Minecraft Java Edition server with the
//! [Server List Ping](https://wiki.vg/Server_List_Ping) protocol.
//!
//! One call opens one TCP connection, sends a handshake and a status request,
//! reads a single length prefixed response frame and closes the connection.
//! Calls share no state and can run concurrently from separate threads.
//!
//! ```no_run
//! use mc_discovery::{discover_server, DiscoveryErr, DEFAULT_PORT, DEFAULT_TIMEOUT};
//!
//! fn main() -> Result<(), DiscoveryErr> {
//!     let status = discover_server("mc.example.com", DEFAULT_PORT, DEFAULT_TIMEOUT)?;
//!
//!     println!("{}/{} online, {}ms", status.online_players, status.max_players, status.latency_ms);
//!     Ok(())
//! }
//! ```

pub mod address;
mod conf;
mod error;
pub mod mc_string;
mod server;
mod share;
pub mod varint;

pub use address::{is_valid_address, is_valid_address_syntax, resolve_to_ipv4};
pub use conf::{Conf, SocketConf, DEFAULT_PORT, DEFAULT_PROTOCOL_VERSION, DEFAULT_TIMEOUT};
pub use error::{DiscoveryErr, ErrorKind};
pub use server::{
    build_handshake_packet, build_status_request_packet, frame_packet, parse_status_response,
    strip_formatting_codes, FrameBuffer, PlayerSample, ServerStatus, StatusResponse,
    MAX_FRAME_LEN, STATUS_PACKET_ID,
};
use std::time::Duration;

/// Probe `host:port` and return its status.
///
/// `timeout` bounds the whole exchange, from the connection attempt until the
/// response frame is complete. Failures are terminal, nothing is retried.
pub fn discover_server(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<ServerStatus, DiscoveryErr> {
    Conf::create_with_port(host, port)
        .with_timeout(timeout)
        .get_server_status()
}
