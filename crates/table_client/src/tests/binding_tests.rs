use std::sync::{Arc, Mutex};

use shared::{
    keys::{Namespace, PropertyName},
    value::{ControlKind, Value},
};

use crate::binding::{
    registry::{BoundControl, ControlRegistry, RegistryError},
    BindingEngine, RouteOutcome, TableWriter,
};

#[derive(Default)]
struct RecordingWriter {
    puts: Mutex<Vec<(String, Value)>>,
}

impl RecordingWriter {
    fn puts(&self) -> Vec<(String, Value)> {
        self.puts.lock().expect("puts lock").clone()
    }
}

impl TableWriter for RecordingWriter {
    fn put(&self, key: &str, value: Value) {
        self.puts
            .lock()
            .expect("puts lock")
            .push((key.to_string(), value));
    }
}

fn engine() -> (BindingEngine, Arc<RecordingWriter>) {
    let writer = Arc::new(RecordingWriter::default());
    let engine = BindingEngine::new(
        Namespace::smart_dashboard(),
        Arc::clone(&writer) as Arc<dyn TableWriter>,
    );
    (engine, writer)
}

fn name(text: &str) -> PropertyName {
    PropertyName::from(text)
}

#[test]
fn synthesizes_a_numeric_control_and_publishes_integer_edits() {
    let (mut engine, writer) = engine();

    let outcome = engine.route("/SmartDashboard/maxSpeed", Value::Text("12".into()), true);
    assert_eq!(outcome, RouteOutcome::Synthesized(name("maxSpeed")));

    let control = engine.registry().lookup(&name("maxSpeed")).expect("bound");
    assert_eq!(control.kind(), ControlKind::Number);
    assert_eq!(control.text(), "12");
    assert_eq!(control.key(), "/SmartDashboard/maxSpeed");

    let control = engine.registry_mut().get_mut(&name("maxSpeed")).expect("bound");
    *control.text_mut() = "30".to_string();
    control.mark_dirty();
    assert!(engine.apply_edit(&name("maxSpeed")));

    assert_eq!(
        writer.puts(),
        vec![("/SmartDashboard/maxSpeed".to_string(), Value::Number(30.0))]
    );
    let control = engine.registry().lookup(&name("maxSpeed")).expect("bound");
    assert!(!control.is_dirty());
}

#[test]
fn toggles_a_boolean_control_in_place_without_duplicating_it() {
    let (mut engine, _writer) = engine();

    let outcome = engine.route("/SmartDashboard/debugMode", Value::Text("true".into()), true);
    assert_eq!(outcome, RouteOutcome::Synthesized(name("debugMode")));

    let control = engine.registry().lookup(&name("debugMode")).expect("bound");
    assert_eq!(control.kind(), ControlKind::Boolean);
    assert!(control.is_checked());

    let outcome = engine.route(
        "/SmartDashboard/debugMode",
        Value::Text("false".into()),
        false,
    );
    assert_eq!(outcome, RouteOutcome::Refreshed(name("debugMode")));

    let control = engine.registry().lookup(&name("debugMode")).expect("bound");
    assert!(!control.is_checked());
    assert_eq!(engine.registry().len(), 1);
}

#[test]
fn rapid_repeated_new_notifications_bind_exactly_one_control() {
    let (mut engine, _writer) = engine();

    let first = engine.route("/SmartDashboard/kP", Value::Text("0.4".into()), true);
    let second = engine.route("/SmartDashboard/kP", Value::Text("0.4".into()), true);

    assert_eq!(first, RouteOutcome::Synthesized(name("kP")));
    assert_eq!(second, RouteOutcome::Refreshed(name("kP")));
    assert_eq!(engine.registry().len(), 1);
}

#[test]
fn registry_rejects_duplicate_registration_and_keeps_the_original() {
    let mut registry = ControlRegistry::new();
    let original = BoundControl::new(
        name("kP"),
        "/SmartDashboard/kP".to_string(),
        ControlKind::Number,
        &Value::Number(0.4),
    );
    let replacement = BoundControl::new(
        name("kP"),
        "/SmartDashboard/kP".to_string(),
        ControlKind::Number,
        &Value::Number(9.9),
    );

    registry.register(original).expect("first registration");
    assert_eq!(
        registry.register(replacement),
        Err(RegistryError::DuplicateRegistration(name("kP")))
    );

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.lookup(&name("kP")).expect("retained").text(), "0.4");
}

#[test]
fn ignores_keys_outside_the_watched_namespace() {
    let (mut engine, _writer) = engine();

    for _ in 0..10 {
        let outcome = engine.route("/robot/internal_tick", Value::Number(5.0), true);
        assert_eq!(outcome, RouteOutcome::OutOfScope);
    }

    assert!(engine.registry().is_empty());
}

#[test]
fn reports_refresh_for_an_unseen_property_without_creating_one() {
    let (mut engine, _writer) = engine();

    let outcome = engine.route("/SmartDashboard/ghost", Value::Number(1.0), false);
    assert_eq!(outcome, RouteOutcome::Unbound(name("ghost")));
    assert!(engine.registry().is_empty());
}

#[test]
fn registry_refresh_requires_an_existing_entry() {
    let mut registry = ControlRegistry::new();
    assert_eq!(
        registry.refresh(&name("ghost"), &Value::Number(1.0)),
        Err(RegistryError::UnboundRefresh(name("ghost")))
    );
}

#[test]
fn boolean_edit_publishes_the_checkbox_state() {
    let (mut engine, writer) = engine();
    engine.route("/SmartDashboard/soft_limits", Value::Bool(false), true);

    let control = engine
        .registry_mut()
        .get_mut(&name("soft_limits"))
        .expect("bound");
    *control.checked_mut() = true;
    assert!(engine.apply_edit(&name("soft_limits")));

    assert_eq!(
        writer.puts(),
        vec![("/SmartDashboard/soft_limits".to_string(), Value::Bool(true))]
    );
}

#[test]
fn text_edit_publishes_the_raw_buffer() {
    let (mut engine, writer) = engine();
    engine.route("/SmartDashboard/selected_auto", Value::Text("".into()), true);

    let control = engine
        .registry_mut()
        .get_mut(&name("selected_auto"))
        .expect("bound");
    *control.text_mut() = "two cube scale".to_string();
    control.mark_dirty();
    assert!(engine.apply_edit(&name("selected_auto")));

    assert_eq!(
        writer.puts(),
        vec![(
            "/SmartDashboard/selected_auto".to_string(),
            Value::Text("two cube scale".to_string())
        )]
    );
}

#[test]
fn refuses_to_publish_an_unparseable_numeric_buffer() {
    let (mut engine, writer) = engine();
    engine.route("/SmartDashboard/maxSpeed", Value::Number(12.0), true);

    let control = engine
        .registry_mut()
        .get_mut(&name("maxSpeed"))
        .expect("bound");
    *control.text_mut() = "fast".to_string();
    control.mark_dirty();

    assert!(!engine.apply_edit(&name("maxSpeed")));
    assert!(writer.puts().is_empty());
}

#[test]
fn truncates_fractional_numeric_edits_to_integers() {
    let (mut engine, writer) = engine();
    engine.route("/SmartDashboard/maxSpeed", Value::Number(12.0), true);

    let control = engine
        .registry_mut()
        .get_mut(&name("maxSpeed"))
        .expect("bound");
    *control.text_mut() = "2.9".to_string();
    assert!(engine.apply_edit(&name("maxSpeed")));

    assert_eq!(
        writer.puts(),
        vec![("/SmartDashboard/maxSpeed".to_string(), Value::Number(2.0))]
    );
}

#[test]
fn edit_for_an_unbound_property_is_dropped() {
    let (mut engine, writer) = engine();
    assert!(!engine.apply_edit(&name("ghost")));
    assert!(writer.puts().is_empty());
}

#[test]
fn mixed_notification_sequences_preserve_the_no_duplicate_invariant() {
    let (mut engine, _writer) = engine();

    let notifications = [
        ("/SmartDashboard/maxSpeed", Value::Text("12".into()), true),
        ("/SmartDashboard/debugMode", Value::Text("true".into()), true),
        ("/SmartDashboard/maxSpeed", Value::Text("14".into()), true),
        ("/robot/internal_tick", Value::Number(1.0), true),
        ("/SmartDashboard/debugMode", Value::Text("false".into()), false),
        ("/SmartDashboard/label", Value::Text("left".into()), true),
        ("/SmartDashboard/maxSpeed", Value::Text("15".into()), false),
    ];
    for (key, value, is_new) in notifications {
        engine.route(key, value, is_new);
    }

    assert_eq!(engine.registry().len(), 3);
    let mut seen = std::collections::HashSet::new();
    for control in engine.registry().iter() {
        assert!(seen.insert(control.name().clone()), "duplicate control");
    }
    let control = engine.registry().lookup(&name("maxSpeed")).expect("bound");
    assert_eq!(control.text(), "15");
}
