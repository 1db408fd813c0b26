//! Codec Module
//!
//! Turns tabular results into byte payloads and back. A [`Strategy`] picks the
//! text format (JSON or CSV) and whether the text is zlib-compressed.

mod compression;
mod delimited;
mod strategy;
mod table;

#[cfg(test)]
mod property_tests;

use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{CacheError, Result};

// Re-export public types
pub use compression::{compress, decompress};
pub use strategy::{Format, Strategy};
pub use table::{ArrayRow, ObjectRow, TabularResult};

// == Public Constants ==
/// Compression level used when none is configured
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

// == Codec ==
/// Stateless encoder/decoder carrying the compression level.
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    level: Compression,
}

impl Codec {
    // == Constructor ==
    /// Creates a codec compressing at `level` (0-9, higher values are clamped).
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }

    pub fn level(&self) -> u32 {
        self.level.level()
    }

    // == Encode ==
    /// Serializes `table` with `strategy`.
    pub fn encode(&self, table: &TabularResult, strategy: Strategy) -> Result<Vec<u8>> {
        let text = match strategy.format {
            Format::Json => serde_json::to_vec(table)
                .map_err(|e| CacheError::Internal(format!("JSON encode failed: {}", e)))?,
            Format::Csv => delimited::write_table(table, false)?,
            Format::CsvHeader => delimited::write_table(table, true)?,
        };

        let payload = self.pack(text, strategy.compressed)?;
        debug!(
            "Encoded {} rows as {}: {} bytes",
            table.len(),
            strategy,
            payload.len()
        );
        Ok(payload)
    }

    // == Decode ==
    /// Parses a payload produced by [`Codec::encode`] with the same strategy.
    pub fn decode(&self, bytes: &[u8], strategy: Strategy) -> Result<TabularResult> {
        let text = unpack(bytes, strategy.compressed)?;
        let table = match strategy.format {
            Format::Json => serde_json::from_slice(&text)
                .map_err(|e| CacheError::MalformedPayload(format!("JSON parse failed: {}", e)))?,
            Format::Csv => delimited::read_table(&text, false)?,
            Format::CsvHeader => delimited::read_table(&text, true)?,
        };

        debug!(
            "Decoded {} bytes as {}: {} rows",
            bytes.len(),
            strategy,
            table.len()
        );
        Ok(table)
    }

    // == Arbitrary JSON Values ==
    /// Serializes any value as JSON, optionally compressed.
    pub fn encode_value<T: Serialize>(&self, value: &T, compressed: bool) -> Result<Vec<u8>> {
        let text = serde_json::to_vec(value)
            .map_err(|e| CacheError::Internal(format!("JSON encode failed: {}", e)))?;
        self.pack(text, compressed)
    }

    /// Reverses [`Codec::encode_value`].
    pub fn decode_value<T: DeserializeOwned>(&self, bytes: &[u8], compressed: bool) -> Result<T> {
        let text = unpack(bytes, compressed)?;
        serde_json::from_slice(&text)
            .map_err(|e| CacheError::MalformedPayload(format!("JSON parse failed: {}", e)))
    }

    fn pack(&self, text: Vec<u8>, compressed: bool) -> Result<Vec<u8>> {
        if compressed {
            compress(&text, self.level)
        } else {
            Ok(text)
        }
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_LEVEL)
    }
}

fn unpack(bytes: &[u8], compressed: bool) -> Result<Vec<u8>> {
    if compressed {
        decompress(bytes)
    } else {
        Ok(bytes.to_vec())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn people() -> TabularResult {
        serde_json::from_value(json!([
            {"name": "Ada Lovelace", "latitude": 51.5072, "active": true, "note": null},
            {"name": "Grace \"Amazing\" Hopper", "latitude": -12.25, "active": false, "note": "a,b"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_json_roundtrip_both_modes() {
        let codec = Codec::default();
        for compressed in [false, true] {
            let strategy = Strategy::new(Format::Json, compressed);
            let bytes = codec.encode(&people(), strategy).unwrap();
            assert_eq!(codec.decode(&bytes, strategy).unwrap(), people());
        }
    }

    #[test]
    fn test_json_floats_are_bit_exact() {
        let codec = Codec::default();
        let floats: [f64; 3] = [1.0715660391465826e-75, -1.81996730402717e-179, -1.603964615428183e143];
        let table = TabularResult::Arrays(vec![floats.iter().map(|&f| Value::from(f)).collect()]);

        let bytes = codec.encode(&table, Strategy::json_zlib()).unwrap();
        let decoded = codec.decode(&bytes, Strategy::json_zlib()).unwrap();

        let TabularResult::Arrays(rows) = decoded else {
            panic!("expected array rows");
        };
        let bits: Vec<u64> = rows[0].iter().map(|v| v.as_f64().unwrap().to_bits()).collect();
        let expected: Vec<u64> = floats.iter().map(|f| f.to_bits()).collect();
        assert_eq!(bits, expected);
    }

    #[test]
    fn test_json_uncompressed_is_plain_text() {
        let codec = Codec::default();
        let table: TabularResult = serde_json::from_value(json!([[1, "a"]])).unwrap();
        let bytes = codec
            .encode(&table, Strategy::new(Format::Json, false))
            .unwrap();
        assert_eq!(bytes, br#"[[1,"a"]]"#);
    }

    #[test]
    fn test_json_keeps_field_order() {
        let codec = Codec::default();
        let table: TabularResult =
            serde_json::from_str(r#"[{"zeta":1,"alpha":2,"mid":3}]"#).unwrap();
        let bytes = codec
            .encode(&table, Strategy::new(Format::Json, false))
            .unwrap();
        assert_eq!(bytes, br#"[{"zeta":1,"alpha":2,"mid":3}]"#);
    }

    #[test]
    fn test_csv_is_lossy_to_strings() {
        let codec = Codec::default();
        let strategy = Strategy::new(Format::Csv, true);
        let bytes = codec.encode(&people(), strategy).unwrap();
        let decoded = codec.decode(&bytes, strategy).unwrap();
        assert_eq!(decoded, people().to_arrays().stringified());
    }

    #[test]
    fn test_csv_header_keeps_names() {
        let codec = Codec::default();
        let strategy = Strategy::new(Format::CsvHeader, false);
        let bytes = codec.encode(&people(), strategy).unwrap();
        let decoded = codec.decode(&bytes, strategy).unwrap();
        assert_eq!(decoded, people().stringified());
    }

    #[test]
    fn test_compression_shrinks_repetitive_tables() {
        let codec = Codec::default();
        let rows: Vec<ArrayRow> = (0..200)
            .map(|i| vec![json!("Main Street"), json!(i)])
            .collect();
        let table = TabularResult::from(rows);

        let plain = codec.encode(&table, Strategy::new(Format::Json, false)).unwrap();
        let packed = codec.encode(&table, Strategy::json_zlib()).unwrap();
        assert!(packed.len() * 2 < plain.len());
    }

    #[test]
    fn test_decode_invalid_json() {
        let codec = Codec::default();
        let result = codec.decode(b"[{\"a\":", Strategy::new(Format::Json, false));
        assert!(matches!(result, Err(CacheError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_json_that_is_not_a_table() {
        let codec = Codec::default();
        let result = codec.decode(br#"{"a":1}"#, Strategy::new(Format::Json, false));
        assert!(matches!(result, Err(CacheError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_corrupt_stream() {
        let codec = Codec::default();
        let result = codec.decode(b"\x00\x01\x02\x03", Strategy::json_zlib());
        assert!(matches!(result, Err(CacheError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_uncompressed_payload_as_compressed_fails() {
        let codec = Codec::default();
        let bytes = codec
            .encode(&people(), Strategy::new(Format::Json, false))
            .unwrap();
        assert!(codec.decode(&bytes, Strategy::json_zlib()).is_err());
    }

    #[test]
    fn test_value_roundtrip() {
        let codec = Codec::default();
        let obj = json!({"a": 1, "b": true, "c": "1234"});
        let zipped = codec.encode_value(&obj, true).unwrap();
        let unzipped: Value = codec.decode_value(&zipped, true).unwrap();
        assert_eq!(unzipped, obj);
    }

    #[test]
    fn test_level_is_clamped() {
        assert_eq!(Codec::new(42).level(), 9);
        assert_eq!(Codec::new(0).level(), 0);
    }
}
