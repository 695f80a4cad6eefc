//! Protocol codec
//!
//! Framing and message encoding for the wire protocol.
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Len (4)  │ CRC (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! - Len: payload length, big endian
//! - CRC: CRC32 of the payload, big endian
//! - Payload: bincode encoding of a `Request` or `Response`

use std::io::{self, Read, Write};

use bincode::Options;
use bytes::{BufMut, Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};
use super::{Request, Response};

/// Header size: 4 bytes length + 4 bytes CRC32
pub const HEADER_SIZE: usize = 8;

/// Maximum payload size (64 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 64 * 1024 * 1024;

fn message_options() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_PAYLOAD_SIZE as u64)
}

// =============================================================================
// Framing
// =============================================================================

/// Wrap a payload in a frame
pub fn encode_frame(payload: &[u8]) -> Result<Bytes> {
    if payload.len() > MAX_PAYLOAD_SIZE as usize {
        return Err(StoreError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    let mut frame = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    frame.put_u32(payload.len() as u32);
    frame.put_u32(crc32fast::hash(payload));
    frame.put_slice(payload);

    Ok(frame.freeze())
}

/// Parse the header fields, validating the declared length
fn parse_header(header: &[u8]) -> Result<(usize, u32)> {
    let payload_len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let checksum = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);

    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(StoreError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    Ok((payload_len as usize, checksum))
}

fn verify_checksum(payload: &[u8], expected: u32) -> Result<()> {
    let actual = crc32fast::hash(payload);
    if actual != expected {
        return Err(StoreError::Protocol(format!(
            "Checksum mismatch: expected 0x{:08x}, got 0x{:08x}",
            expected, actual
        )));
    }
    Ok(())
}

/// Extract and verify the payload of a complete frame
pub fn decode_frame(bytes: &[u8]) -> Result<&[u8]> {
    if bytes.len() < HEADER_SIZE {
        return Err(StoreError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let (payload_len, checksum) = parse_header(&bytes[..HEADER_SIZE])?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(StoreError::Protocol(format!(
            "Incomplete payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    let payload = &bytes[HEADER_SIZE..total_len];
    verify_checksum(payload, checksum)?;
    Ok(payload)
}

/// Read one frame from a stream, returning its payload
///
/// Blocks until a complete frame is received or an error occurs
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let (payload_len, checksum) = parse_header(&header)?;

    // Grows with the bytes actually received, not with the declared length
    let mut payload = Vec::new();
    reader.by_ref().take(payload_len as u64).read_to_end(&mut payload)?;
    if payload.len() < payload_len {
        return Err(StoreError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "Incomplete payload: expected {} bytes, got {}",
                payload_len,
                payload.len()
            ),
        )));
    }

    verify_checksum(&payload, checksum)?;
    Ok(payload)
}

/// Write one frame to a stream
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let frame = encode_frame(payload)?;
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Message Encoding/Decoding
// =============================================================================

fn encode_message<T: Serialize>(message: &T) -> Result<Bytes> {
    let payload = message_options()
        .serialize(message)
        .map_err(|e| StoreError::Protocol(format!("Cannot encode message: {}", e)))?;
    encode_frame(&payload)
}

fn decode_message<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    message_options()
        .deserialize(payload)
        .map_err(|e| StoreError::Protocol(format!("Malformed message: {}", e)))
}

/// Encode a request as a complete frame
pub fn encode_request(request: &Request) -> Result<Bytes> {
    encode_message(request)
}

/// Decode a request from a complete frame
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    decode_message(decode_frame(bytes)?)
}

/// Encode a response as a complete frame
pub fn encode_response(response: &Response) -> Result<Bytes> {
    encode_message(response)
}

/// Decode a response from a complete frame
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    decode_message(decode_frame(bytes)?)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete request from a stream
pub fn read_request<R: Read>(reader: &mut R) -> Result<Request> {
    let payload = read_frame(reader)?;
    decode_message(&payload)
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let frame = encode_request(request)?;
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let payload = read_frame(reader)?;
    decode_message(&payload)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let frame = encode_response(response)?;
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}
