//! Payload encoding for the ingestion endpoint.
//!
//! A record travels as `snappy(base64(utf8(json)))`: the JSON text is
//! base64-encoded with the standard padded alphabet and the resulting ASCII
//! is compressed with the Snappy raw block format.

use base64::Engine;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

const BASE64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Snappy compression failed: {0}")]
    Compression(#[from] snap::Error),
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encodes JSON text into a request body.
pub fn encode_json(json: &str) -> Result<Bytes, EncodingError> {
    let encoded = BASE64.encode(json.as_bytes());
    let compressed = snap::raw::Encoder::new().compress_vec(encoded.as_bytes())?;
    Ok(Bytes::from(compressed))
}

/// Serializes a document to JSON and encodes it.
pub fn encode_document<T: Serialize + ?Sized>(document: &T) -> Result<Bytes, EncodingError> {
    let json = serde_json::to_string(document)?;
    encode_json(&json)
}

/// Reverses [`encode_json`], as the ingestion endpoint does.
pub fn decode_payload(body: &[u8]) -> Result<String, EncodingError> {
    let decompressed = snap::raw::Decoder::new().decompress_vec(body)?;
    let json = BASE64.decode(decompressed)?;
    Ok(String::from_utf8(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_preserves_json_bytes() {
        let json = r#"{"level":1,"content":"héllo wörld ✓","params":{"n":[1,2,3]}}"#;
        let body = encode_json(json).unwrap();
        assert_eq!(decode_payload(&body).unwrap(), json);
    }

    #[test]
    fn test_intermediate_is_base64_of_json() {
        let json = r#"{"label":"op","duration":42}"#;
        let body = encode_json(json).unwrap();

        let decompressed = snap::raw::Decoder::new().decompress_vec(&body).unwrap();
        assert_eq!(decompressed, BASE64.encode(json).into_bytes());
    }

    #[test]
    fn test_encode_document_matches_serde_json() {
        let document = json!({ "label": "op", "duration": 42 });
        let body = encode_document(&document).unwrap();
        assert_eq!(
            decode_payload(&body).unwrap(),
            serde_json::to_string(&document).unwrap()
        );
    }

    #[test]
    fn test_empty_document() {
        let body = encode_json("").unwrap();
        assert_eq!(decode_payload(&body).unwrap(), "");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_payload(b"definitely not snappy").is_err());
    }

    #[test]
    fn test_large_repetitive_payload_compresses() {
        let json = serde_json::to_string(&json!({ "content": "a".repeat(64 * 1024) })).unwrap();
        let body = encode_json(&json).unwrap();
        assert!(body.len() < json.len());
        assert_eq!(decode_payload(&body).unwrap(), json);
    }
}
