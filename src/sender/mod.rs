pub mod client;
pub mod encoding;
pub mod stats;

pub use client::{ClientConfig, ClientError, DEFAULT_TIMEOUT, HttpTransport, Transport};
pub use encoding::{EncodingError, decode_payload, encode_document, encode_json};
pub use stats::{DeliveryStats, DeliveryStatsSnapshot};
