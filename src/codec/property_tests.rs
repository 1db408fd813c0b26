//! Property-Based Tests for Codec Module
//!
//! Uses proptest to check round trips over generated tables and byte strings.

use proptest::prelude::*;
use serde_json::{Map, Value};

use crate::codec::{compress, decompress, Codec, Format, Strategy as Encoding, TabularResult};

// == Strategies ==
/// Scalars that survive a JSON round trip exactly
fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        ".{0,24}".prop_map(Value::String),
        any::<i64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::from),
        any::<bool>().prop_map(Value::Bool),
        Just(Value::Null),
    ]
}

/// Scalars a CSV round trip can represent as text
fn text_scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        ".{0,24}".prop_map(Value::String),
        any::<i32>().prop_map(Value::from),
    ]
}

fn array_table_strategy() -> impl Strategy<Value = TabularResult> {
    prop::collection::vec(prop::collection::vec(scalar_strategy(), 0..8), 0..20)
        .prop_map(TabularResult::Arrays)
}

fn object_table_strategy() -> impl Strategy<Value = TabularResult> {
    prop::collection::vec(
        prop::collection::vec(("[a-zA-Z_]{1,10}", scalar_strategy()), 0..8),
        0..20,
    )
    .prop_map(|rows| {
        TabularResult::Objects(
            rows.into_iter()
                .map(|fields| fields.into_iter().collect::<Map<String, Value>>())
                .collect(),
        )
    })
}

fn table_strategy() -> impl Strategy<Value = TabularResult> {
    prop_oneof![array_table_strategy(), object_table_strategy()]
}

/// Rectangular array tables with at least one field per row
fn csv_table_strategy() -> impl Strategy<Value = TabularResult> {
    (1usize..6).prop_flat_map(|width| {
        prop::collection::vec(
            prop::collection::vec(text_scalar_strategy(), width..=width),
            0..20,
        )
        .prop_map(TabularResult::Arrays)
    })
}

/// Object tables where every row carries the same columns
fn csv_object_table_strategy() -> impl Strategy<Value = TabularResult> {
    prop::collection::vec("[a-z]{1,8}", 1..6).prop_flat_map(|columns| {
        let width = columns.len();
        prop::collection::vec(
            prop::collection::vec(text_scalar_strategy(), width..=width),
            0..20,
        )
        .prop_map(move |rows| {
            TabularResult::Objects(
                rows.into_iter()
                    .map(|values| columns.iter().cloned().zip(values).collect())
                    .collect(),
            )
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Any table expressible as JSON decodes to itself, compressed or not.
    #[test]
    fn prop_json_roundtrip(table in table_strategy(), compressed in any::<bool>()) {
        let codec = Codec::default();
        let strategy = Encoding::new(Format::Json, compressed);

        let bytes = codec.encode(&table, strategy).unwrap();
        let decoded = codec.decode(&bytes, strategy).unwrap();
        prop_assert_eq!(decoded, table);
    }

    // CSV keeps the row/column structure and turns every scalar into a string.
    #[test]
    fn prop_csv_lossy_roundtrip(table in csv_table_strategy(), compressed in any::<bool>()) {
        let codec = Codec::default();
        let strategy = Encoding::new(Format::Csv, compressed);

        let bytes = codec.encode(&table, strategy).unwrap();
        let decoded = codec.decode(&bytes, strategy).unwrap();
        prop_assert_eq!(decoded.len(), table.len());
        prop_assert_eq!(decoded, table.stringified());
    }

    // Header-bearing CSV gives back the field names as well.
    #[test]
    fn prop_csv_header_roundtrip(table in csv_object_table_strategy()) {
        let codec = Codec::default();
        let strategy = Encoding::new(Format::CsvHeader, true);

        let bytes = codec.encode(&table, strategy).unwrap();
        let decoded = codec.decode(&bytes, strategy).unwrap();
        prop_assert_eq!(decoded, table.stringified());
    }

    // Inflate reverses deflate for arbitrary bytes, including the empty input.
    #[test]
    fn prop_compression_roundtrip(
        bytes in prop::collection::vec(any::<u8>(), 0..4096),
        level in 0u32..=9
    ) {
        let packed = compress(&bytes, flate2::Compression::new(level)).unwrap();
        prop_assert_eq!(decompress(&packed).unwrap(), bytes);
    }

    // Encoding is deterministic for a given strategy and level.
    #[test]
    fn prop_encode_deterministic(table in table_strategy()) {
        let codec = Codec::default();
        let first = codec.encode(&table, Encoding::json_zlib()).unwrap();
        let second = codec.encode(&table, Encoding::json_zlib()).unwrap();
        prop_assert_eq!(first, second);
    }
}
