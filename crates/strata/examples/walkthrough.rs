//! End-to-end walkthrough of the sequential-data store.
//!
//! This example mirrors the classic store walkthrough: it defines wave
//! types, creates streams, inserts/updates/replaces/deletes events, and
//! reads them back with windows, interpolation, filtering, sampling,
//! property overrides, and stream views. Every resource created along the
//! way is recorded and released in reverse order at the end; each release
//! is independently fallible and merely logged on failure.
//!
//! Run with: `cargo run --example walkthrough`

use anyhow::Result;

use strata::wave::{wave, wave_compound_type, wave_integer_type, wave_target_type, wave_type};
use strata::{
    Boundary, Direction, FilterExpr, Key, MemoryStore, PropertyOverride, SequentialStore,
    StoreError, StreamDefinition, ViewDefinition, ViewProperty,
};

const NAMESPACE: &str = "walkthrough";

const TYPE_ID: &str = "WaveData_SampleType";
const TARGET_TYPE_ID: &str = "WaveDataTarget_SampleType";
const INTEGER_TYPE_ID: &str = "WaveData_IntegerType";
const COMPOUND_TYPE_ID: &str = "SampleType_Compound";
const STREAM_ID: &str = "WaveData_SampleStream";
const STREAM_ID_SECONDARY: &str = "SampleStream_Secondary";
const STREAM_ID_COMPOUND: &str = "SampleStream_Compound";
const VIEW_ID: &str = "WaveData_SampleStreamView";
const VIEW_INT_ID: &str = "WaveData_SampleIntStreamView";

/// A resource created during the walkthrough, released at teardown.
enum Resource {
    Type(&'static str),
    Stream(&'static str),
    View(&'static str),
}

fn release(store: &mut MemoryStore, resource: &Resource) -> Result<(), StoreError> {
    match resource {
        Resource::Type(id) => store.delete_type(NAMESPACE, id),
        Resource::Stream(id) => store.delete_stream(NAMESPACE, id),
        Resource::View(id) => store.delete_stream_view(NAMESPACE, id),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut store = MemoryStore::new();
    let mut resources: Vec<Resource> = Vec::new();

    let outcome = run(&mut store, &mut resources);

    // Scoped cleanup: reverse creation order, each release independently
    // fallible and logged.
    println!();
    println!("Cleaning up {} resources", resources.len());
    for resource in resources.iter().rev() {
        if let Err(error) = release(&mut store, resource) {
            println!("Encountered error during cleanup: {error}");
        }
    }

    outcome?;
    println!("Complete!");
    Ok(())
}

#[allow(clippy::too_many_lines)]
fn run(store: &mut MemoryStore, resources: &mut Vec<Resource>) -> Result<()> {
    println!("Strata sequential-data store walkthrough");
    println!("----------------------------------------");

    // Type and stream creation
    println!("Creating the wave type");
    let wave_descriptor = store.get_or_create_type(NAMESPACE, wave_type(TYPE_ID)?)?;
    resources.push(Resource::Type(TYPE_ID));

    println!("Creating a stream for wave events");
    store.create_or_update_stream(
        NAMESPACE,
        StreamDefinition::new(STREAM_ID, TYPE_ID)
            .with_name("WaveStreamSample")
            .with_description("A stream to store the wave events"),
    )?;
    resources.push(Resource::Stream(STREAM_ID));

    // Insert a single event, then a batch
    println!("Inserting data");
    store.insert_values(NAMESPACE, STREAM_ID, vec![wave(0, 2.0).event(&wave_descriptor)?])?;
    let batch: Result<Vec<_>, _> =
        (1..10).map(|i| wave(i * 2, 2.0).event(&wave_descriptor)).collect();
    store.insert_values(NAMESPACE, STREAM_ID, batch?)?;

    println!("Getting latest event");
    println!("{}", store.get_last_value(NAMESPACE, STREAM_ID)?);
    println!();

    let window =
        store.get_window_values(NAMESPACE, STREAM_ID, &Key::from(0i64), &Key::from(180i64), None)?;
    println!("Getting all events");
    println!("Total events found: {}", window.len());
    for event in &window {
        println!("{event}");
    }
    println!();

    // Update: overwrite the stored events and extend past them
    println!("Updating events");
    store.update_values(NAMESPACE, STREAM_ID, vec![wave(0, 4.0).event(&wave_descriptor)?])?;
    let updates: Result<Vec<_>, _> =
        (1..20).map(|i| wave(i * 2, 4.0).event(&wave_descriptor)).collect();
    store.update_values(NAMESPACE, STREAM_ID, updates?)?;

    let window =
        store.get_window_values(NAMESPACE, STREAM_ID, &Key::from(0i64), &Key::from(40i64), None)?;
    println!("Getting updated events");
    println!("Total events found: {}", window.len());

    // Replace: overwrite every stored event in place
    println!("Replacing events");
    store.replace_values(NAMESPACE, STREAM_ID, vec![wave(0, 5.0).event(&wave_descriptor)?])?;
    let replacements: Result<Vec<_>, _> =
        (1..20).map(|i| wave(i * 2, 5.0).event(&wave_descriptor)).collect();
    store.replace_values(NAMESPACE, STREAM_ID, replacements?)?;

    let window =
        store.get_window_values(NAMESPACE, STREAM_ID, &Key::from(0i64), &Key::from(180i64), None)?;
    println!("Getting replaced events");
    println!("Total events found: {}", window.len());
    println!();

    // Interpolated reads at evenly spaced positions
    println!("Values can be interpolated or extrapolated at positions where");
    println!("no event is stored:");
    let interpolated = store.get_range_values_interpolated(
        NAMESPACE,
        STREAM_ID,
        &Key::from(5i64),
        &Key::from(32i64),
        4,
    )?;
    for event in &interpolated {
        println!("{event}");
    }
    println!();

    // Filtered window
    println!("Getting filtered events");
    let filter = FilterExpr::parse("Radians lt 3")?;
    let filtered = store.get_window_values(
        NAMESPACE,
        STREAM_ID,
        &Key::from(0i64),
        &Key::from(50i64),
        Some(&filter),
    )?;
    println!("Total events found: {}", filtered.len());
    println!();

    // Sampling
    println!("Getting sampled values");
    let sampled = store.get_sampled_values(
        NAMESPACE,
        STREAM_ID,
        &Key::from(0i64),
        &Key::from(40i64),
        "Sin",
        4,
    )?;
    println!("Total events found: {}", sampled.len());
    println!();

    // Property overrides
    println!("Property overrides");
    println!("Reading at position 1, where no event is stored, interpolates");
    println!("a value for every continuous property:");
    let calculated = store.get_range_values(
        NAMESPACE,
        STREAM_ID,
        &Key::from(1i64),
        3,
        Direction::Forward,
        Boundary::ExactOrCalculated,
        None,
    )?;
    for event in &calculated {
        println!(
            "Order: {} Radians: {} Cos: {}",
            event.get("Order").map(ToString::to_string).unwrap_or_default(),
            event.get("Radians").map(ToString::to_string).unwrap_or_default(),
            event.get("Cos").map(ToString::to_string).unwrap_or_default(),
        );
    }

    println!();
    println!("A discrete override on Radians suppresses the calculation for");
    println!("that property only; it reads as the kind's zero value:");
    store.create_or_update_stream(
        NAMESPACE,
        StreamDefinition::new(STREAM_ID, TYPE_ID)
            .with_name("WaveStreamSample")
            .with_override(PropertyOverride::discrete("Radians")),
    )?;
    let calculated = store.get_range_values(
        NAMESPACE,
        STREAM_ID,
        &Key::from(1i64),
        3,
        Direction::Forward,
        Boundary::ExactOrCalculated,
        None,
    )?;
    for event in &calculated {
        println!(
            "Order: {} Radians: {} Cos: {}",
            event.get("Order").map(ToString::to_string).unwrap_or_default(),
            event.get("Radians").map(ToString::to_string).unwrap_or_default(),
            event.get("Cos").map(ToString::to_string).unwrap_or_default(),
        );
    }
    println!();

    // Stream views
    println!("Stream views");
    store.get_or_create_type(NAMESPACE, wave_target_type(TARGET_TYPE_ID)?)?;
    resources.push(Resource::Type(TARGET_TYPE_ID));
    store.get_or_create_type(NAMESPACE, wave_integer_type(INTEGER_TYPE_ID)?)?;
    resources.push(Resource::Type(INTEGER_TYPE_ID));

    // Same shape: let the store derive the mapping
    store.get_or_create_stream_view(
        NAMESPACE,
        ViewDefinition::new(VIEW_ID, TYPE_ID, TARGET_TYPE_ID),
    )?;
    resources.push(Resource::View(VIEW_ID));

    // Different shape and kinds: map explicitly
    store.get_or_create_stream_view(
        NAMESPACE,
        ViewDefinition::new(VIEW_INT_ID, TYPE_ID, INTEGER_TYPE_ID).with_properties(vec![
            ViewProperty::new("Order", "OrderTarget"),
            ViewProperty::new("Sin", "SinInt"),
            ViewProperty::new("Cos", "CosInt"),
            ViewProperty::new("Tan", "TanInt"),
        ]),
    )?;
    resources.push(Resource::View(VIEW_INT_ID));

    println!("Here is some of the data as it is stored:");
    let stored = store.get_range_values(
        NAMESPACE,
        STREAM_ID,
        &Key::from(1i64),
        3,
        Direction::Forward,
        Boundary::ExactOrCalculated,
        None,
    )?;
    for event in &stored {
        println!(
            "Sin: {} Cos: {} Tan: {}",
            event.get("Sin").map(ToString::to_string).unwrap_or_default(),
            event.get("Cos").map(ToString::to_string).unwrap_or_default(),
            event.get("Tan").map(ToString::to_string).unwrap_or_default(),
        );
    }

    println!();
    println!("A view onto a same-shaped type returns values mapped onto the");
    println!("target's properties:");
    let mapped = store.get_range_values(
        NAMESPACE,
        STREAM_ID,
        &Key::from(1i64),
        3,
        Direction::Forward,
        Boundary::ExactOrCalculated,
        Some(VIEW_ID),
    )?;
    for event in &mapped {
        println!(
            "SinTarget: {} CosTarget: {} TanTarget: {}",
            event.get("SinTarget").map(ToString::to_string).unwrap_or_default(),
            event.get("CosTarget").map(ToString::to_string).unwrap_or_default(),
            event.get("TanTarget").map(ToString::to_string).unwrap_or_default(),
        );
    }

    println!();
    println!("Views can also convert between kinds; these integers were");
    println!("stored as floats:");
    let narrowed = store.get_range_values(
        NAMESPACE,
        STREAM_ID,
        &Key::from(1i64),
        3,
        Direction::Forward,
        Boundary::ExactOrCalculated,
        Some(VIEW_INT_ID),
    )?;
    for event in &narrowed {
        println!(
            "SinInt: {} CosInt: {} TanInt: {}",
            event.get("SinInt").map(ToString::to_string).unwrap_or_default(),
            event.get("CosInt").map(ToString::to_string).unwrap_or_default(),
            event.get("TanInt").map(ToString::to_string).unwrap_or_default(),
        );
    }

    println!();
    println!("The automatically derived view map:");
    for entry in store.get_stream_view_map(NAMESPACE, VIEW_ID)? {
        match entry.target {
            Some(target) => println!("{} => {}", entry.source, target),
            None => println!("{} => Not mapped", entry.source),
        }
    }

    println!();
    println!("The explicit view map lists every source property, mapped or");
    println!("not:");
    for entry in store.get_stream_view_map(NAMESPACE, VIEW_INT_ID)? {
        match entry.target {
            Some(target) => println!("{} => {}", entry.source, target),
            None => println!("{} => Not mapped", entry.source),
        }
    }
    println!();

    // Retype the stream through the same-shape view
    println!("Updating the stream type through the view");
    let first_before = store.get_first_value(NAMESPACE, STREAM_ID)?;
    store.update_stream_type(NAMESPACE, STREAM_ID, VIEW_ID)?;
    let stream = store.get_stream(NAMESPACE, STREAM_ID)?;
    let first_after = store.get_first_value(NAMESPACE, STREAM_ID)?;
    println!("The stream is now of type {} (was {})", stream.type_id, TYPE_ID);
    println!("First value before: {first_before}");
    println!("First value after:  {first_after}");
    println!();

    // Type listing and queries
    let all_types = store.types(NAMESPACE, 0, 100)?;
    println!("All types:");
    for descriptor in &all_types {
        println!("{}", descriptor.id());
    }
    let queried = store.find_types(NAMESPACE, "*Target*")?;
    println!("Types matching *Target*:");
    for descriptor in &queried {
        println!("{}", descriptor.id());
    }
    println!();

    // Deleting values
    println!("Deleting values from the stream");
    store.remove_value(NAMESPACE, STREAM_ID, &Key::from(0i64))?;
    store.remove_window_values(NAMESPACE, STREAM_ID, &Key::from(0i64), &Key::from(40i64))?;
    match store.get_last_value(NAMESPACE, STREAM_ID) {
        Err(StoreError::NotFound(_)) => println!("All values deleted successfully!"),
        Ok(event) => anyhow::bail!("expected an empty stream, found {event}"),
        Err(error) => return Err(error.into()),
    }
    println!();

    // Secondary indexes
    println!("Adding a stream with a secondary index");
    store.create_or_update_stream(
        NAMESPACE,
        StreamDefinition::new(STREAM_ID_SECONDARY, TYPE_ID).with_index("Radians"),
    )?;
    resources.push(Resource::Stream(STREAM_ID_SECONDARY));
    let secondary = store.get_stream(NAMESPACE, STREAM_ID_SECONDARY)?;
    println!("Secondary indexes on the new stream: {}", secondary.indexes.len());

    println!("Modifying the sample stream to carry a secondary index");
    let mut sample = store.get_stream(NAMESPACE, STREAM_ID)?;
    sample.indexes = vec!["RadiansTarget".to_owned()];
    store.create_or_update_stream(NAMESPACE, sample)?;
    println!(
        "Secondary indexes on the sample stream: {}",
        store.get_stream(NAMESPACE, STREAM_ID)?.indexes.len()
    );

    println!("Removing the secondary index again");
    let mut secondary = store.get_stream(NAMESPACE, STREAM_ID_SECONDARY)?;
    secondary.indexes.clear();
    store.create_or_update_stream(NAMESPACE, secondary)?;
    println!(
        "Secondary indexes on the secondary stream: {}",
        store.get_stream(NAMESPACE, STREAM_ID_SECONDARY)?.indexes.len()
    );
    println!();

    // Compound keys
    println!("Creating a type with a compound index");
    let compound_descriptor =
        store.get_or_create_type(NAMESPACE, wave_compound_type(COMPOUND_TYPE_ID)?)?;
    resources.push(Resource::Type(COMPOUND_TYPE_ID));

    println!("Creating a stream off the compound type");
    store.create_or_update_stream(
        NAMESPACE,
        StreamDefinition::new(STREAM_ID_COMPOUND, COMPOUND_TYPE_ID),
    )?;
    resources.push(Resource::Stream(STREAM_ID_COMPOUND));

    println!("Inserting compound data");
    let pairs = [(1, 10.0), (2, 2.0), (3, 1.0), (10, 3.0), (10, 8.0), (10, 10.0)];
    let compound_events: Result<Vec<_>, _> = pairs
        .iter()
        .map(|&(order, multiplier)| wave(order, multiplier).event(&compound_descriptor))
        .collect();
    store.insert_values(NAMESPACE, STREAM_ID_COMPOUND, compound_events?)?;

    let first = store.get_first_value(NAMESPACE, STREAM_ID_COMPOUND)?;
    let last = store.get_last_value(NAMESPACE, STREAM_ID_COMPOUND)?;
    println!("First key: {} Latest key: {}", first.key(), last.key());

    let window = store.get_window_values(
        NAMESPACE,
        STREAM_ID_COMPOUND,
        &Key::from((2, 1)),
        &Key::from((10, 8)),
        None,
    )?;
    println!("Window data:");
    for event in &window {
        println!("{}: {event}", event.key());
    }

    Ok(())
}
