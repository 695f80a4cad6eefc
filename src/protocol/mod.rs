//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Len (4)  │ CRC (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! A client sends one `Request` frame and reads one `Response` frame back.
//! The payload is bincode; the format is private to this crate's server and
//! client and carries no compatibility promise.

mod request;
mod response;
mod codec;

pub use request::Request;
pub use response::{Failure, Reply, Response};
pub use codec::{
    decode_frame, decode_request, decode_response, encode_frame, encode_request,
    encode_response, read_frame, read_request, read_response, write_frame, write_request,
    write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
