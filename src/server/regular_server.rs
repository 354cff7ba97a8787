use super::{
    build_handshake_packet, build_status_request_packet, parse_status_response, ServerStatus,
};
use crate::{
    conf::Conf,
    share::{create_tcp_socket, remaining_budget},
    varint::peek_varint,
    DiscoveryErr,
};
use log::{debug, trace, warn};
use std::{
    io::{Read, Write},
    net::{Shutdown, TcpStream},
    time::{Duration, Instant},
};

/// Packets cannot be larger than 2^21 - 1 bytes, the largest length a
/// 3 byte VarInt can declare.
pub const MAX_FRAME_LEN: usize = 2_097_151;
const READ_CHUNK_SIZE: usize = 4096;

/// Lifecycle of a single probe. Every probe ends in exactly one of
/// [ProbeState::Complete] or [ProbeState::Failed].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProbeState {
    Connecting,
    AwaitingFrame,
    Complete,
    Failed,
}

impl ProbeState {
    fn allows(self, next: ProbeState) -> bool {
        use ProbeState::*;

        matches!(
            (self, next),
            (Connecting, AwaitingFrame)
                | (Connecting, Failed)
                | (AwaitingFrame, Complete)
                | (AwaitingFrame, Failed)
        )
    }
}

/// Accumulates bytes from the stream until one length prefixed frame is complete.
///
/// TCP may split the frame over many reads or coalesce it with trailing data,
/// so nothing is parsed until the declared length has been buffered.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    bufs: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.bufs.extend_from_slice(chunk);
    }

    pub fn len(&self) -> usize {
        self.bufs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bufs.is_empty()
    }

    /// Take the payload of the first frame once it is fully buffered.
    ///
    /// Returns `Ok(None)` while more data is needed. Bytes following the frame
    /// are discarded together with the buffer.
    pub fn try_take_frame(&mut self) -> Result<Option<Vec<u8>>, DiscoveryErr> {
        let (frame_len, prefix_len) = match peek_varint(&self.bufs, 0)? {
            Some(decoded) => decoded,
            None => return Ok(None),
        };
        let frame_len = frame_len as usize;

        if frame_len == 0 || frame_len > MAX_FRAME_LEN {
            return Err(DiscoveryErr::ProtocolViolation(format!(
                "Frame length must be between 1 and {}, but got {}",
                MAX_FRAME_LEN, frame_len
            )));
        }

        if self.bufs.len() - prefix_len < frame_len {
            return Ok(None);
        }

        let payload = self.bufs[prefix_len..prefix_len + frame_len].to_vec();
        self.bufs.clear();

        Ok(Some(payload))
    }
}

/// One status probe against one server, owning its deadline and state.
struct Probe<'a> {
    conf: &'a Conf,
    state: ProbeState,
    deadline: Instant,
}

impl<'a> Probe<'a> {
    fn create(conf: &'a Conf) -> Self {
        Self {
            conf,
            state: ProbeState::Connecting,
            deadline: Instant::now() + conf.socket_conf.timeout,
        }
    }

    /// Move to `next`. Terminal states are final, illegal moves are refused.
    fn transition(&mut self, next: ProbeState) -> bool {
        if !self.state.allows(next) {
            warn!(
                "{}: refusing probe transition {:?} -> {:?}",
                self.conf, self.state, next
            );
            return false;
        }

        trace!("{}: {:?} -> {:?}", self.conf, self.state, next);
        self.state = next;
        true
    }

    fn budget(&self) -> Duration {
        self.conf.socket_conf.timeout
    }

    fn remaining(&self) -> Result<Duration, DiscoveryErr> {
        remaining_budget(self.deadline, self.budget())
    }

    fn run(&mut self) -> Result<ServerStatus, DiscoveryErr> {
        let mut socket = create_tcp_socket(self.conf, self.deadline)?;
        let handshake_packet = build_handshake_packet(
            &self.conf.host,
            self.conf.port,
            self.conf.socket_conf.protocol_version,
        );
        let status_request_packet = build_status_request_packet();

        // Latency is measured from the handshake write, after the connection
        // is established, until the response frame is complete.
        let started = Instant::now();

        socket.set_write_timeout(Some(self.remaining()?))?;
        // Handshake must precede the status request.
        for packet in [&handshake_packet, &status_request_packet] {
            socket
                .write_all(packet)
                .map_err(|err| DiscoveryErr::from_stream_io(err, self.budget()))?;
        }
        debug!(
            "{}: sent handshake ({} bytes) and status request",
            self.conf,
            handshake_packet.len()
        );

        self.transition(ProbeState::AwaitingFrame);

        let payload = self.read_frame(&mut socket)?;
        let latency_ms = started.elapsed().as_millis() as u64;

        // Close before parsing, nothing else is read from this connection.
        let _ = socket.shutdown(Shutdown::Both);
        drop(socket);

        debug!(
            "{}: status frame complete ({} bytes) in {}ms",
            self.conf,
            payload.len(),
            latency_ms
        );

        Ok(parse_status_response(&payload)?.into_server_status(
            &self.conf.host,
            self.conf.port,
            latency_ms,
        ))
    }

    fn read_frame(&self, socket: &mut TcpStream) -> Result<Vec<u8>, DiscoveryErr> {
        let mut frame = FrameBuffer::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            if let Some(payload) = frame.try_take_frame()? {
                return Ok(payload);
            }

            socket.set_read_timeout(Some(self.remaining()?))?;

            let read_len = match socket.read(&mut chunk) {
                Ok(read_len) => read_len,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(DiscoveryErr::from_stream_io(err, self.budget())),
            };

            if read_len == 0 {
                return Err(DiscoveryErr::ProtocolViolation(format!(
                    "Connection closed before a complete frame ({} bytes buffered)",
                    frame.len()
                )));
            }

            frame.push(&chunk[..read_len]);
            trace!(
                "{}: read {} bytes, {} buffered",
                self.conf,
                read_len,
                frame.len()
            );
        }
    }
}

/// Run a full status probe: connect, handshake, status request, read one
/// response frame, close.
///
/// The whole exchange, connecting included, shares the single timeout of
/// [crate::SocketConf::timeout]. No retries are attempted.
pub fn get_server_status(conf: &Conf) -> Result<ServerStatus, DiscoveryErr> {
    if conf.port == 0 {
        return Err(DiscoveryErr::ConnectionFailed(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "port must be between 1 and 65535",
        )));
    }

    let mut probe = Probe::create(conf);
    let result = probe.run();

    match &result {
        Ok(_) => {
            probe.transition(ProbeState::Complete);
        }
        Err(err) => {
            debug!("{}: probe failed: {}", conf, err);
            probe.transition(ProbeState::Failed);
        }
    }

    result
}
