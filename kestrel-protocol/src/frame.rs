//! Length-prefixed framing
//!
//! Every message on the connection is `length: i32` followed by exactly
//! `length` bytes. Encoding reserves the prefix, writes the message after
//! it and backpatches the real size once it is known.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::{len_to_i32, Decodable, Encodable};
use crate::error::{DecodeError, EncodeError};

/// Size of the length prefix in bytes
pub const LENGTH_PREFIX: usize = 4;

/// Encode `message` with its length prefix.
pub fn encode_frame<T: Encodable>(message: &T) -> Result<BytesMut, EncodeError> {
    let mut buf = BytesMut::with_capacity(LENGTH_PREFIX + message.encoded_len());
    buf.put_i32(0);
    message.encode(&mut buf)?;

    let len = len_to_i32("frame", buf.len() - LENGTH_PREFIX)?;
    buf[..LENGTH_PREFIX].copy_from_slice(&len.to_be_bytes());
    Ok(buf)
}

/// Read the length prefix without consuming anything.
///
/// Returns `None` while fewer than four bytes are buffered.
pub fn peek_frame_len(buf: &[u8]) -> Result<Option<usize>, DecodeError> {
    let Some(prefix) = buf.get(..LENGTH_PREFIX) else {
        return Ok(None);
    };
    let len = i32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
    usize::try_from(len)
        .map(Some)
        .map_err(|_| DecodeError::InvalidLength {
            kind: "frame",
            len: len.into(),
        })
}

/// Split one complete frame body off the front of `buf`.
///
/// Returns `Ok(None)` and leaves `buf` untouched when the frame is not
/// fully buffered yet. Bytes past the frame stay in `buf`.
pub fn split_frame(buf: &mut BytesMut, max_frame_size: usize) -> Result<Option<Bytes>, DecodeError> {
    let Some(len) = peek_frame_len(buf)? else {
        return Ok(None);
    };
    if len > max_frame_size {
        return Err(DecodeError::InvalidLength {
            kind: "frame",
            len: len as i64,
        });
    }
    if buf.len() < LENGTH_PREFIX + len {
        return Ok(None);
    }

    buf.advance(LENGTH_PREFIX);
    Ok(Some(buf.split_to(len).freeze()))
}

/// Decode a message that must fill the whole frame body.
pub fn decode_frame_body<T>(
    mut body: Bytes,
    decode: impl FnOnce(&mut Bytes) -> Result<T, DecodeError>,
) -> Result<T, DecodeError> {
    let value = decode(&mut body)?;
    if body.has_remaining() {
        return Err(DecodeError::TrailingBytes(body.remaining()));
    }
    Ok(value)
}

/// [`decode_frame_body`] for types that decode without extra context.
pub fn decode_frame<T: Decodable>(body: Bytes) -> Result<T, DecodeError> {
    decode_frame_body(body, |buf| T::decode(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::KafkaString;

    #[test]
    fn test_length_is_backpatched() {
        let frame = encode_frame(&KafkaString::from("hello")).unwrap();
        assert_eq!(&frame[..4], &7i32.to_be_bytes());
        assert_eq!(&frame[4..], b"\x00\x05hello");
    }

    #[test]
    fn test_split_waits_for_full_frame() {
        let mut buf = BytesMut::from(&[0u8, 0, 0][..]);
        assert_eq!(split_frame(&mut buf, 1024).unwrap(), None);

        buf.extend_from_slice(&[6, 1, 2, 3]);
        assert_eq!(split_frame(&mut buf, 1024).unwrap(), None);
        assert_eq!(buf.len(), 7);

        buf.extend_from_slice(&[4, 5, 6, 0xaa]);
        let body = split_frame(&mut buf, 1024).unwrap().unwrap();
        assert_eq!(&body[..], &[1, 2, 3, 4, 5, 6]);
        assert_eq!(&buf[..], &[0xaa]);
    }

    #[test]
    fn test_split_back_to_back_frames() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&encode_frame(&1i32).unwrap());
        buf.extend_from_slice(&encode_frame(&2i32).unwrap());

        let first = split_frame(&mut buf, 16).unwrap().unwrap();
        let second = split_frame(&mut buf, 16).unwrap().unwrap();
        assert_eq!(decode_frame::<i32>(first).unwrap(), 1);
        assert_eq!(decode_frame::<i32>(second).unwrap(), 2);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_rejects_negative_and_oversized_lengths() {
        let mut negative = BytesMut::from(&(-1i32).to_be_bytes()[..]);
        assert!(matches!(
            split_frame(&mut negative, 1024),
            Err(DecodeError::InvalidLength { len: -1, .. })
        ));

        let mut oversized = BytesMut::from(&2048i32.to_be_bytes()[..]);
        assert!(matches!(
            split_frame(&mut oversized, 1024),
            Err(DecodeError::InvalidLength { len: 2048, .. })
        ));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let body = Bytes::from_static(&[0, 0, 0, 1, 9]);
        assert_eq!(
            decode_frame::<i32>(body),
            Err(DecodeError::TrailingBytes(1))
        );
    }
}
