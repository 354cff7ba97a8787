//! Length prefixed UTF-8 strings as used by the Minecraft protocol.

use crate::{
    varint::{decode_varint, encode_varint},
    DiscoveryErr,
};

/// Encode a string: its UTF-8 byte length as a VarInt, then the bytes.
pub fn encode_string(str: &str) -> Vec<u8> {
    let bytes = str.as_bytes();
    let mut result = encode_varint(bytes.len() as u32);

    result.extend_from_slice(bytes);
    result
}

/// Decode the string starting at `offset`, returning it together with the
/// number of bytes consumed (prefix included).
pub fn decode_string(bufs: &[u8], offset: usize) -> Result<(String, usize), DiscoveryErr> {
    let (str_len, prefix_len) = decode_varint(bufs, offset)?;
    let start = offset + prefix_len;
    let remaining = bufs.len().saturating_sub(start);

    if str_len as usize > remaining {
        return Err(DiscoveryErr::ProtocolViolation(format!(
            "String declares {} bytes, but only {} remain",
            str_len, remaining
        )));
    }

    let end = start + str_len as usize;
    let str = std::str::from_utf8(&bufs[start..end])?;

    Ok((str.to_owned(), prefix_len + str_len as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn encodes_prefix_then_bytes() {
        assert_eq!(encode_string(""), vec![0x00]);
        assert_eq!(
            encode_string("localhost"),
            [&[0x09][..], b"localhost"].concat()
        );
        // Byte length, not char count.
        assert_eq!(encode_string("§a")[0], 3);
    }

    #[test]
    fn decodes_what_it_encodes() {
        let long = "x".repeat(300);
        let samples = ["", "A Minecraft Server", "§6Bem-vindo §lao servidor", "日本語", long.as_str()];

        for str in samples {
            let bufs = encode_string(str);
            assert_eq!(decode_string(&bufs, 0).unwrap(), (str.to_string(), bufs.len()));
        }
    }

    #[test]
    fn declared_length_beyond_buffer_is_rejected() {
        let bufs = [0x05, b'a', b'b'];
        let err = decode_string(&bufs, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProtocolViolation);
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let bufs = [0x02, 0xC3, 0x28];
        let err = decode_string(&bufs, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProtocolViolation);
    }
}
