// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! View-result extraction and the transport seam.
//!
//! A read-only remote call returns a nested envelope; the payload of
//! interest sits at a fixed structural path (first result, first return
//! value, byte array) and begins with a ULEB128 length prefix the remote
//! environment wraps around return values. [`extract_payload`] navigates the
//! envelope, propagates remote errors, and strips the prefix -- parsing the
//! actual ULEB128 (multi-byte for payloads of 128 bytes or more), never
//! dropping a fixed single byte.
//!
//! The engine does not implement a transport; [`Transport`] is the seam the
//! external collaborator plugs into, and its errors pass through unchanged.

use crate::wire::{peel_uleb128, WireError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::warn;
use serde::Deserialize;
use std::fmt;

/// Errors from envelope parsing and payload extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// The envelope reported a remote error status.
    Remote(String),
    /// The envelope is well-formed but carries no payload at the expected
    /// path.
    MissingPayload(&'static str),
    /// The envelope JSON failed to parse.
    Envelope(String),
    /// The payload's ULEB128 length prefix is malformed.
    Prefix(WireError),
    /// The declared payload length disagrees with the bytes present.
    LengthMismatch { declared: usize, actual: usize },
    /// Base64 return-value bytes failed to decode.
    Base64(String),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(msg) => write!(f, "remote error: {}", msg),
            Self::MissingPayload(what) => write!(f, "response has no {}", what),
            Self::Envelope(msg) => write!(f, "malformed response envelope: {}", msg),
            Self::Prefix(e) => write!(f, "bad payload length prefix: {}", e),
            Self::LengthMismatch { declared, actual } => write!(
                f,
                "payload length prefix declares {} byte(s), {} present",
                declared, actual
            ),
            Self::Base64(msg) => write!(f, "invalid base64 return value: {}", msg),
        }
    }
}

impl std::error::Error for ViewError {}

impl From<WireError> for ViewError {
    fn from(e: WireError) -> Self {
        Self::Prefix(e)
    }
}

// ---------------------------------------------------------------------------
// Envelope types
// ---------------------------------------------------------------------------

/// Response envelope of a read-only remote call.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewResponse {
    /// Execution results, one per command.
    #[serde(default)]
    pub results: Vec<ViewResult>,
    /// Remote error status, if the call failed.
    #[serde(default)]
    pub error: Option<String>,
}

/// One execution result inside the envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewResult {
    /// `(bytes, type tag)` pairs returned by the call.
    #[serde(rename = "returnValues", default)]
    pub return_values: Vec<ReturnValue>,
}

/// A single return value: raw bytes plus the remote's type tag string.
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnValue(pub ReturnBytes, pub String);

/// Return-value bytes arrive either as a JSON number array or as a base64
/// string, depending on the remote endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReturnBytes {
    Raw(Vec<u8>),
    Base64(String),
}

impl ReturnBytes {
    /// Materialize the raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, ViewError> {
        match self {
            Self::Raw(bytes) => Ok(bytes.clone()),
            Self::Base64(text) => BASE64
                .decode(text)
                .map_err(|e| ViewError::Base64(e.to_string())),
        }
    }
}

/// Parse a raw JSON response body into a [`ViewResponse`].
pub fn parse_response(json: &str) -> Result<ViewResponse, ViewError> {
    serde_json::from_str(json).map_err(|e| ViewError::Envelope(e.to_string()))
}

/// Extract the flat payload bytes the field-level deserializer expects.
///
/// Propagates a remote error status instead of decoding, takes the first
/// return value of the first result, and strips the ULEB128 length prefix
/// after cross-checking it against the bytes present.
pub fn extract_payload(response: &ViewResponse) -> Result<Vec<u8>, ViewError> {
    if let Some(error) = &response.error {
        warn!("remote view call failed: {}", error);
        return Err(ViewError::Remote(error.clone()));
    }
    let result = response
        .results
        .first()
        .ok_or(ViewError::MissingPayload("results"))?;
    let value = result
        .return_values
        .first()
        .ok_or(ViewError::MissingPayload("return values"))?;
    let bytes = value.0.decode()?;
    Ok(strip_length_prefix(&bytes)?.to_vec())
}

/// Strip the ULEB128 length prefix from a wrapped payload, validating the
/// declared length against the remaining bytes.
pub fn strip_length_prefix(bytes: &[u8]) -> Result<&[u8], ViewError> {
    let (declared, consumed) = peel_uleb128(bytes)?;
    let payload = &bytes[consumed..];
    if payload.len() != declared as usize {
        return Err(ViewError::LengthMismatch {
            declared: declared as usize,
            actual: payload.len(),
        });
    }
    Ok(payload)
}

/// Base64-wrap encoded field buffers for a JSON transport.
pub fn encode_submit_payloads(buffers: &[Vec<u8>]) -> Vec<String> {
    buffers.iter().map(|b| BASE64.encode(b)).collect()
}

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

/// Acknowledgement of a submitted mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAck {
    /// Remote digest/identifier of the accepted submission.
    pub digest: String,
}

/// Opaque transport failure, propagated unchanged -- retry policy belongs to
/// the transport, not the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport error: {}", self.0)
    }
}

impl std::error::Error for TransportError {}

/// The request/response collaborator the engine submits bytes to.
pub trait Transport {
    /// Submit encoded field buffers tagged with a target identifier.
    fn submit(&mut self, target: &str, payloads: &[Vec<u8>]) -> Result<SubmitAck, TransportError>;

    /// Perform a read-only call, returning the raw response envelope.
    fn view(&mut self, target: &str) -> Result<ViewResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_extract_raw_bytes() {
        // Payload "hi" wrapped in its ULEB128 length prefix (2).
        let json = r#"{
            "results": [
                { "returnValues": [[[2, 104, 105], "0x1::ascii::String"]] }
            ]
        }"#;
        let response = parse_response(json).unwrap();
        assert_eq!(extract_payload(&response).unwrap(), b"hi".to_vec());
    }

    #[test]
    fn extract_base64_bytes() {
        let wrapped = vec![3u8, 1, 2, 3];
        let json = format!(
            r#"{{ "results": [ {{ "returnValues": [["{}", "vector<u8>"]] }} ] }}"#,
            BASE64.encode(&wrapped)
        );
        let response = parse_response(&json).unwrap();
        assert_eq!(extract_payload(&response).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn remote_error_propagated() {
        let json = r#"{ "error": "MoveAbort(4)" }"#;
        let response = parse_response(json).unwrap();
        assert_eq!(
            extract_payload(&response).unwrap_err(),
            ViewError::Remote("MoveAbort(4)".to_string())
        );
    }

    #[test]
    fn empty_results_rejected() {
        let response = parse_response("{}").unwrap();
        assert_eq!(
            extract_payload(&response).unwrap_err(),
            ViewError::MissingPayload("results")
        );

        let response = parse_response(r#"{ "results": [ {} ] }"#).unwrap();
        assert_eq!(
            extract_payload(&response).unwrap_err(),
            ViewError::MissingPayload("return values")
        );
    }

    #[test]
    fn multi_byte_prefix_stripped() {
        // 200-byte payload: prefix is the two bytes 0xc8 0x01, so a naive
        // one-byte drop would corrupt it.
        let payload = vec![0xabu8; 200];
        let mut wrapped = vec![0xc8, 0x01];
        wrapped.extend_from_slice(&payload);
        assert_eq!(strip_length_prefix(&wrapped).unwrap(), &payload[..]);
    }

    #[test]
    fn short_payload_single_byte_prefix() {
        let wrapped = vec![2u8, 7, 8];
        assert_eq!(strip_length_prefix(&wrapped).unwrap(), &[7, 8]);
    }

    #[test]
    fn prefix_length_cross_checked() {
        assert_eq!(
            strip_length_prefix(&[5, 1, 2]).unwrap_err(),
            ViewError::LengthMismatch {
                declared: 5,
                actual: 2
            }
        );
        assert_eq!(
            strip_length_prefix(&[1, 2, 3]).unwrap_err(),
            ViewError::LengthMismatch {
                declared: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn malformed_prefix_rejected() {
        assert!(matches!(
            strip_length_prefix(&[0x80]).unwrap_err(),
            ViewError::Prefix(_)
        ));
        assert!(matches!(
            strip_length_prefix(&[]).unwrap_err(),
            ViewError::Prefix(_)
        ));
    }

    #[test]
    fn malformed_envelope_rejected() {
        assert!(matches!(
            parse_response("not json"),
            Err(ViewError::Envelope(_))
        ));
    }

    #[test]
    fn submit_payloads_base64() {
        let encoded = encode_submit_payloads(&[vec![1, 2], vec![]]);
        assert_eq!(encoded, vec!["AQI=".to_string(), String::new()]);
    }
}
