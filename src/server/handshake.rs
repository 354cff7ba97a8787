use crate::{mc_string::encode_string, varint::encode_varint};

/// Packet id shared by the handshake, the status request and the status response.
pub const STATUS_PACKET_ID: u32 = 0x00;
/// Next state, should be 1 for status, but could also be 2 for login.
const NEXT_STATE_STATUS: u32 = 1;

/// Prefix a packet body (packet id included) with its length as a VarInt.
///
/// See [packet format](https://wiki.vg/Protocol#Packet_format).
pub fn frame_packet(body: &[u8]) -> Vec<u8> {
    let mut packet = encode_varint(body.len() as u32);

    packet.extend_from_slice(body);
    packet
}

/// Build handshake packet buffer.
///
/// The protocol version is the client identity presented to the server, see
/// [protocol version numbers](https://wiki.vg/Protocol_version_numbers).
/// Servers answer status requests regardless of a version mismatch.
pub fn build_handshake_packet(host: &str, port: u16, protocol_version: i32) -> Vec<u8> {
    let mut body = encode_varint(STATUS_PACKET_ID);

    body.append(&mut encode_varint(protocol_version as u32));
    // Server address
    //
    // UTF-8 string prefixed with its size in bytes as a VarInt.
    body.append(&mut encode_string(host));
    body.extend_from_slice(&port.to_be_bytes());
    body.append(&mut encode_varint(NEXT_STATE_STATUS));

    frame_packet(&body)
}

/// Build status request packet buffer.
pub fn build_status_request_packet() -> Vec<u8> {
    frame_packet(&encode_varint(STATUS_PACKET_ID))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_layout() {
        let packet = build_handshake_packet("127.0.0.1", 25565, 765);
        let mut expected = vec![
            0x10, // length: 1 + 2 + 10 + 2 + 1
            0x00, // packet id
            0xFD, 0x05, // protocol version 765
            0x09, // host length
        ];
        expected.extend_from_slice(b"127.0.0.1");
        expected.extend_from_slice(&[0x63, 0xDD]); // 25565 big endian
        expected.push(0x01); // next state

        assert_eq!(packet, expected);
    }

    #[test]
    fn handshake_with_negative_protocol_version() {
        let packet = build_handshake_packet("a.io", 1, -1);

        assert_eq!(packet[0] as usize, packet.len() - 1);
        assert_eq!(&packet[1..7], &[0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        assert_eq!(&packet[packet.len() - 3..], &[0x00, 0x01, 0x01]);
    }

    #[test]
    fn status_request_is_a_bare_packet_id() {
        assert_eq!(build_status_request_packet(), vec![0x01, 0x00]);
    }
}
