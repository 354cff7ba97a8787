use crate::DiscoveryErr;

const SEGMENT_BITS: u32 = 0x7F;
const CHECKER_BIT: u8 = 0x80;
/// VarInts are never longer than 5 bytes.
pub const MAX_VARINT_LEN: usize = 5;

/// Encode the given number as a [VarInt](https://wiki.vg/Protocol#VarInt_and_VarLong).
///
/// Any `u32` fits in at most [MAX_VARINT_LEN] bytes. Negative protocol values
/// (e.g. `-1` as a protocol version) are encoded by casting to `u32` first,
/// which yields their two's complement and always uses the maximum length.
pub fn encode_varint(num: u32) -> Vec<u8> {
    let mut num = num;
    let mut result = Vec::<u8>::with_capacity(MAX_VARINT_LEN);

    loop {
        if (num & (!SEGMENT_BITS)) == 0 {
            result.push(num as u8);

            return result;
        }

        result.push(((num & SEGMENT_BITS) as u8) | CHECKER_BIT);
        num >>= 7;
    }
}

/// Try to decode a VarInt starting at `offset`.
///
/// Returns `Ok(None)` when the buffer ends before the terminating byte, which
/// lets a reader wait for more data instead of failing. Returns the value and
/// the number of bytes consumed otherwise.
pub fn peek_varint(bufs: &[u8], offset: usize) -> Result<Option<(u32, usize)>, DiscoveryErr> {
    let mut result = 0u32;

    for i in 0..MAX_VARINT_LEN {
        let buf = match bufs.get(offset + i) {
            Some(&buf) => buf,
            None => return Ok(None),
        };

        // Only the low 4 bits of the 5th byte fit in 32 bits.
        if i == MAX_VARINT_LEN - 1 && buf & 0x70 != 0 {
            return Err(DiscoveryErr::ProtocolViolation(format!(
                "VarInt overflows 32 bits, last byte: 0x{:02X}",
                buf
            )));
        }

        result |= ((buf as u32) & SEGMENT_BITS) << (i * 7);

        if buf & CHECKER_BIT == 0 {
            return Ok(Some((result, i + 1)));
        }
    }

    Err(DiscoveryErr::ProtocolViolation(format!(
        "VarInts are never longer than {} bytes, but got [{}]",
        MAX_VARINT_LEN,
        bufs[offset..offset + MAX_VARINT_LEN]
            .iter()
            .map(|x| format!("0x{:02X}", x))
            .collect::<Vec<_>>()
            .join(", ")
    )))
}

/// Decode the VarInt starting at `offset`, returning the value and the number
/// of bytes consumed. Running out of data is a protocol violation.
pub fn decode_varint(bufs: &[u8], offset: usize) -> Result<(u32, usize), DiscoveryErr> {
    match peek_varint(bufs, offset)? {
        Some(decoded) => Ok(decoded),
        None => Err(DiscoveryErr::ProtocolViolation(format!(
            "VarInt at offset {} ran out of data ({} bytes available)",
            offset,
            bufs.len().saturating_sub(offset)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn encodes_known_values() {
        assert_eq!(encode_varint(0), vec![0x00]);
        assert_eq!(encode_varint(1), vec![0x01]);
        assert_eq!(encode_varint(127), vec![0x7F]);
        assert_eq!(encode_varint(128), vec![0x80, 0x01]);
        assert_eq!(encode_varint(255), vec![0xFF, 0x01]);
        assert_eq!(encode_varint(25565), vec![0xDD, 0xC7, 0x01]);
        assert_eq!(encode_varint(2097151), vec![0xFF, 0xFF, 0x7F]);
        assert_eq!(encode_varint(765), vec![0xFD, 0x05]);
        assert_eq!(encode_varint(u32::MAX), vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        assert_eq!(
            encode_varint(-1i32 as u32),
            vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]
        );
    }

    #[test]
    fn decodes_what_it_encodes_across_length_boundaries() {
        let samples = [
            0u32,
            1,
            127,
            128,
            16383,
            16384,
            2097151,
            2097152,
            268435455,
            268435456,
            i32::MAX as u32,
            u32::MAX,
        ];

        for value in samples {
            let bufs = encode_varint(value);
            assert_eq!(decode_varint(&bufs, 0).unwrap(), (value, bufs.len()));
        }
    }

    #[test]
    fn decodes_at_offset() {
        let bufs = [0xAA, 0xBB, 0xDD, 0xC7, 0x01, 0x00];
        assert_eq!(decode_varint(&bufs, 2).unwrap(), (25565, 3));
        assert_eq!(decode_varint(&bufs, 5).unwrap(), (0, 1));
    }

    #[test]
    fn five_continuation_bytes_are_rejected() {
        let bufs = [0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        let err = decode_varint(&bufs, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProtocolViolation);
        assert!(peek_varint(&bufs, 0).is_err());
    }

    #[test]
    fn values_beyond_32_bits_are_rejected() {
        for bufs in [
            [0x80, 0x80, 0x80, 0x80, 0x10],
            [0xFF, 0xFF, 0xFF, 0xFF, 0x1F],
            [0x80, 0x80, 0x80, 0x80, 0x70],
        ] {
            let err = decode_varint(&bufs, 0).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ProtocolViolation);
        }

        assert_eq!(
            decode_varint(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F], 0).unwrap(),
            (u32::MAX, 5)
        );
    }

    #[test]
    fn incomplete_varint_waits_for_more_data() {
        assert_eq!(peek_varint(&[0x80, 0x80], 0).unwrap(), None);
        assert_eq!(peek_varint(&[], 0).unwrap(), None);

        let err = decode_varint(&[0xDD, 0xC7], 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProtocolViolation);
    }
}
