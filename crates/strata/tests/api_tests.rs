//! Facade-level tests: the wave payload flowing through the public API.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use strata::wave::{wave, wave_compound_type, wave_integer_type, wave_target_type, wave_type};
use strata::{
    codec, Boundary, Direction, Key, MemoryStore, PropertyOverride, SequentialStore, StoreError,
    StreamDefinition, Value, ViewDefinition, ViewProperty,
};

const NS: &str = "api";

fn wave_store() -> (MemoryStore, Arc<strata::TypeDescriptor>) {
    let mut store = MemoryStore::new();
    let descriptor = store.get_or_create_type(NS, wave_type("Wave").unwrap()).unwrap();
    store.create_or_update_stream(NS, StreamDefinition::new("wave1", "Wave")).unwrap();
    let events: Vec<_> =
        (0..10).map(|i| wave(i * 2, 2.0).event(&descriptor).unwrap()).collect();
    store.insert_values(NS, "wave1", events).unwrap();
    (store, descriptor)
}

#[test]
fn decode_encode_roundtrip_for_wave_events() {
    let descriptor = Arc::new(wave_type("Wave").unwrap());
    let original = wave(12, 2.5).event(&descriptor).unwrap();

    let encoded = codec::encode(&original);
    let decoded = codec::decode(&descriptor, &encoded).unwrap();
    assert_eq!(original, decoded);
}

#[test]
fn json_fields_decode_with_backfill() {
    let descriptor = Arc::new(wave_type("Wave").unwrap());
    let json: serde_json::Value =
        serde_json::from_str(r#"{"Order": 2, "Sin": 1.5, "Tau": null}"#).unwrap();

    let event = codec::decode(&descriptor, &codec::from_json(&json).unwrap()).unwrap();
    assert_eq!(event.get("Order"), Some(&Value::Int(2)));
    assert_eq!(event.get("Sin"), Some(&Value::Float(1.5)));
    // Absent and null fields read as zero, never as missing
    assert_eq!(event.get("Tau"), Some(&Value::Float(0.0)));
    assert_eq!(event.get("Cosh"), Some(&Value::Float(0.0)));
}

#[test]
fn windowed_reads_over_the_wave_payload() {
    let (store, _) = wave_store();

    let window = store
        .get_window_values(NS, "wave1", &Key::from(0i64), &Key::from(18i64), None)
        .unwrap();
    assert_eq!(window.len(), 10);

    let last = store.get_last_value(NS, "wave1").unwrap();
    assert_eq!(last.get("Order"), Some(&Value::Int(18)));
    assert_eq!(last.get("Sin"), Some(&Value::Float(wave(18, 2.0).sin)));
}

#[test]
fn calculated_boundary_with_override_on_wave_stream() {
    let (mut store, _) = wave_store();

    store
        .create_or_update_stream(
            NS,
            StreamDefinition::new("wave1", "Wave")
                .with_override(PropertyOverride::discrete("Radians")),
        )
        .unwrap();

    let events = store
        .get_range_values(
            NS,
            "wave1",
            &Key::from(1i64),
            3,
            Direction::Forward,
            Boundary::ExactOrCalculated,
            None,
        )
        .unwrap();

    let synthesized = &events[0];
    assert_eq!(synthesized.get("Order"), Some(&Value::Int(1)));
    // Radians is discrete: zero instead of a calculated value
    assert_eq!(synthesized.get("Radians"), Some(&Value::Float(0.0)));
    // Sin stays continuous: midpoint of the neighbors at 0 and 2
    let expected = (wave(0, 2.0).sin + wave(2, 2.0).sin) / 2.0;
    assert_eq!(synthesized.get("Sin"), Some(&Value::Float(expected)));
}

#[test]
fn implicit_and_explicit_views_over_the_wave_stream() {
    let (mut store, _) = wave_store();
    store.get_or_create_type(NS, wave_target_type("Target").unwrap()).unwrap();
    store.get_or_create_type(NS, wave_integer_type("IntType").unwrap()).unwrap();

    store.get_or_create_stream_view(NS, ViewDefinition::new("auto", "Wave", "Target")).unwrap();
    store
        .get_or_create_stream_view(
            NS,
            ViewDefinition::new("narrow", "Wave", "IntType").with_properties(vec![
                ViewProperty::new("Order", "OrderTarget"),
                ViewProperty::new("Sin", "SinInt"),
                ViewProperty::new("Cos", "CosInt"),
                ViewProperty::new("Tan", "TanInt"),
            ]),
        )
        .unwrap();

    // The implicit view reproduces every value under the renamed shape
    let mapped = store
        .get_range_values(
            NS,
            "wave1",
            &Key::from(2i64),
            1,
            Direction::Forward,
            Boundary::Exact,
            Some("auto"),
        )
        .unwrap();
    assert_eq!(mapped[0].get("SinTarget"), Some(&Value::Float(wave(2, 2.0).sin)));

    // The explicit view truncates toward zero
    let narrowed = store
        .get_range_values(
            NS,
            "wave1",
            &Key::from(2i64),
            1,
            Direction::Forward,
            Boundary::Exact,
            Some("narrow"),
        )
        .unwrap();
    assert_eq!(narrowed[0].get("SinInt"), Some(&Value::Int(wave(2, 2.0).sin.trunc() as i64)));

    // Both maps enumerate all nine source properties
    assert_eq!(store.get_stream_view_map(NS, "auto").unwrap().len(), 9);
    let map = store.get_stream_view_map(NS, "narrow").unwrap();
    assert_eq!(map.len(), 9);
    assert_eq!(map.iter().filter(|entry| entry.target.is_some()).count(), 4);
}

#[test]
fn compound_wave_stream_orders_by_order_then_multiplier() {
    let mut store = MemoryStore::new();
    let compound =
        store.get_or_create_type(NS, wave_compound_type("Compound").unwrap()).unwrap();
    store.create_or_update_stream(NS, StreamDefinition::new("compound", "Compound")).unwrap();

    let pairs = [(1, 10.0), (2, 2.0), (3, 1.0), (10, 3.0), (10, 8.0), (10, 10.0)];
    let events: Vec<_> = pairs
        .iter()
        .map(|&(order, multiplier)| wave(order, multiplier).event(&compound).unwrap())
        .collect();
    store.insert_values(NS, "compound", events).unwrap();

    assert_eq!(store.get_first_value(NS, "compound").unwrap().key().to_string(), "1|10");
    assert_eq!(store.get_last_value(NS, "compound").unwrap().key().to_string(), "10|10");

    let window = store
        .get_window_values(NS, "compound", &Key::from((2, 1)), &Key::from((10, 8)), None)
        .unwrap();
    let keys: Vec<String> = window.iter().map(|e| e.key().to_string()).collect();
    assert_eq!(keys, vec!["2|2", "3|1", "10|3", "10|8"]);
}

#[test]
fn teardown_errors_are_reportable_without_aborting() {
    let (mut store, _) = wave_store();

    // Deleting a type still referenced by a stream fails but leaves the
    // store usable; the caller may log and continue
    assert!(store.delete_type(NS, "Wave").is_err());
    assert!(store.get_last_value(NS, "wave1").is_ok());

    store.delete_stream(NS, "wave1").unwrap();
    store.delete_type(NS, "Wave").unwrap();
    assert!(matches!(store.get_type(NS, "Wave"), Err(StoreError::NotFound(_))));
}
