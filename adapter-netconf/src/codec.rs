//! RFC 6242 message framing.
//!
//! A NETCONF-over-SSH session starts with one `<hello>` in each direction
//! delimited by the `]]>]]>` end-of-message marker; every later message uses
//! chunked framing (`\n#<size>\n` chunks terminated by `\n##\n`). The codec
//! carries whole messages as strings; XML interpretation happens above it.

use tokio_util::bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::SessionError;

const HELLO_TERMINATOR: &[u8] = b"]]>]]>";

/// Maximum chunk size as per RFC 6242.
const MAX_CHUNK_SIZE: usize = 4294967295;

/// Maximum length of a chunk-size header in characters.
const MAX_CHUNK_SIZE_LEN: usize = 10;

/// Codec translating the SSH byte stream to and from NETCONF messages.
#[derive(Debug, Default)]
pub struct FrameCodec {
    hello_received: bool,
    hello_sent: bool,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }

    fn decode_chunked(&self, src: &mut BytesMut) -> Result<Option<String>, SessionError> {
        let mut offset = 0;
        let mut message = Vec::new();
        loop {
            if src.len() < offset + 2 {
                return Ok(None);
            }
            if &src[offset..offset + 2] != b"\n#" {
                return Err(SessionError::Frame(
                    "chunk does not start with LF HASH".to_string(),
                ));
            }
            offset += 2;

            let header_end = src[offset..]
                .iter()
                .take(MAX_CHUNK_SIZE_LEN + 1)
                .position(|&b| b == b'\n');
            let Some(header_len) = header_end else {
                if src.len() > offset + MAX_CHUNK_SIZE_LEN {
                    return Err(SessionError::Frame("chunk-size header too long".to_string()));
                }
                return Ok(None);
            };
            let header = &src[offset..offset + header_len];
            offset += header_len + 1;

            if header == b"#" {
                // End-of-chunks marker, the message is complete.
                let text = String::from_utf8(message)
                    .map_err(|e| SessionError::Frame(format!("invalid UTF-8 in frame: {e}")))?;
                src.advance(offset);
                return Ok(Some(text));
            }

            let size: usize = std::str::from_utf8(header)?.parse()?;
            if size == 0 || size > MAX_CHUNK_SIZE {
                return Err(SessionError::Frame(format!("invalid chunk size {size}")));
            }
            if src.len() < offset + size {
                return Ok(None);
            }
            message.extend_from_slice(&src[offset..offset + size]);
            offset += size;
        }
    }
}

impl Decoder for FrameCodec {
    type Item = String;
    type Error = SessionError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, SessionError> {
        if !self.hello_received {
            let pos = src
                .windows(HELLO_TERMINATOR.len())
                .position(|w| w == HELLO_TERMINATOR);
            let Some(pos) = pos else { return Ok(None) };
            let frame = src.split_to(pos + HELLO_TERMINATOR.len());
            let text = std::str::from_utf8(&frame[..pos])?.to_string();
            self.hello_received = true;
            return Ok(Some(text));
        }
        self.decode_chunked(src)
    }
}

impl Encoder<String> for FrameCodec {
    type Error = SessionError;

    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<(), SessionError> {
        if !self.hello_sent {
            dst.extend_from_slice(item.as_bytes());
            dst.extend_from_slice(HELLO_TERMINATOR);
            self.hello_sent = true;
        } else {
            dst.extend_from_slice(format!("\n#{}\n", item.len()).as_bytes());
            dst.extend_from_slice(item.as_bytes());
            dst.extend_from_slice(b"\n##\n");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello_done() -> FrameCodec {
        FrameCodec {
            hello_received: true,
            hello_sent: true,
        }
    }

    #[test]
    fn test_decode_hello_frame() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from(&b"<hello/>]]>]]>"[..]);
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg, "<hello/>");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_hello_waits_for_terminator() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from(&b"<hello/>]]>"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b"]]>");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "<hello/>");
    }

    #[test]
    fn test_decode_single_chunk() {
        let mut codec = hello_done();
        let mut buf = BytesMut::from(&b"\n#8\n<rpc/>ab\n##\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "<rpc/>ab");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_multiple_chunks() {
        let mut codec = hello_done();
        let mut buf = BytesMut::from(&b"\n#4\n<rpc\n#2\n/>\n##\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "<rpc/>");
    }

    #[test]
    fn test_decode_partial_chunk_waits() {
        let mut codec = hello_done();
        let mut buf = BytesMut::from(&b"\n#10\n<rpc"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b"-data>\n##\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "<rpc-data>");
    }

    #[test]
    fn test_decode_two_messages_back_to_back() {
        let mut codec = hello_done();
        let mut buf = BytesMut::from(&b"\n#3\none\n##\n\n#3\ntwo\n##\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "one");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "two");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_bad_chunk_prefix() {
        let mut codec = hello_done();
        let mut buf = BytesMut::from(&b"garbage"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(SessionError::Frame(_))
        ));
    }

    #[test]
    fn test_decode_zero_chunk_size() {
        let mut codec = hello_done();
        let mut buf = BytesMut::from(&b"\n#0\n\n##\n"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(SessionError::Frame(_))
        ));
    }

    #[test]
    fn test_encode_hello_then_chunked() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        codec.encode("<hello/>".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"<hello/>]]>]]>");

        buf.clear();
        codec.encode("<rpc/>".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"\n#6\n<rpc/>\n##\n");
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let mut codec = hello_done();
        let mut buf = BytesMut::new();
        let payload = "<rpc message-id=\"101\"><get-config/></rpc>".to_string();
        codec.encode(payload.clone(), &mut buf).unwrap();
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), payload);
    }
}
