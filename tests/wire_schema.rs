// Schema validation tests for the radio and MQTT wire formats
//
// These tests construct JSON values directly (independent of Rust structs)
// and validate them against the JSON Schema files in schemas/radio/.

use serde_json::json;

use lora_sentinel::protocol::StatusMessage;
use lora_sentinel::state::NodeState;

fn load_schema(name: &str) -> serde_json::Value {
    let path = format!(
        "{}/schemas/radio/{name}",
        env!("CARGO_MANIFEST_DIR")
    );
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read schema {path}: {e}"));
    serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("Failed to parse schema {path}: {e}"))
}

fn build_validator(schema_name: &str) -> jsonschema::Validator {
    let schema = load_schema(schema_name);
    jsonschema::options()
        .with_retriever(LocalRetriever)
        .build(&schema)
        .unwrap_or_else(|e| panic!("Failed to compile schema {schema_name}: {e}"))
}

fn validate(schema_name: &str, instance: &serde_json::Value) {
    let validator = build_validator(schema_name);
    let errors: Vec<_> = validator.iter_errors(instance).collect();
    if !errors.is_empty() {
        let msgs: Vec<String> = errors.iter().map(|e| format!("  - {e}")).collect();
        panic!(
            "Schema validation failed for {schema_name}:\n{}\nInstance: {}",
            msgs.join("\n"),
            serde_json::to_string_pretty(instance).unwrap()
        );
    }
}

fn validate_fails(schema_name: &str, instance: &serde_json::Value) {
    let validator = build_validator(schema_name);
    assert!(
        !validator.is_valid(instance),
        "Expected schema validation to fail for {schema_name}, but it passed.\nInstance: {}",
        serde_json::to_string_pretty(instance).unwrap()
    );
}

// Retriever that loads $ref schemas from the local filesystem
struct LocalRetriever;

impl jsonschema::Retrieve for LocalRetriever {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<String>,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let schema_dir = format!("{}/schemas/radio/", env!("CARGO_MANIFEST_DIR"));

        let filename = if let Some(rest) = uri_str.strip_prefix("json-schema:///") {
            rest
        } else if let Some(path) = uri_str.strip_prefix("file://") {
            let text = std::fs::read_to_string(path)?;
            return Ok(serde_json::from_str(&text)?);
        } else {
            uri_str
        };

        let path = format!("{schema_dir}{filename}");
        if std::path::Path::new(&path).exists() {
            let text = std::fs::read_to_string(&path)?;
            return Ok(serde_json::from_str(&text)?);
        }
        Err(format!("Cannot retrieve schema: {uri_str}").into())
    }
}

// =========================================================================
// Outbound status
// =========================================================================

#[test]
fn status_valid() {
    validate(
        "status.schema.json",
        &json!({
            "type": "STATUS",
            "id": "RX-1A2B3C",
            "busy": false,
            "alarm": false,
            "ready": true,
            "time": 123456
        }),
    );
}

#[test]
fn status_encoded_from_state_is_valid() {
    // The real encoder's output conforms, not just hand-built values.
    let mut state = NodeState::new("RX-1A2B3C".to_string());
    state.alarm_active = true;
    state.is_ready = false;
    let json = StatusMessage::from_state(&state, 42_000).encode().unwrap();
    let instance: serde_json::Value = serde_json::from_str(&json).unwrap();
    validate("status.schema.json", &instance);
}

#[test]
fn status_wrong_type_rejected() {
    validate_fails(
        "status.schema.json",
        &json!({
            "type": "MOTION",
            "id": "RX-1A2B3C",
            "busy": false,
            "alarm": false,
            "ready": true,
            "time": 123456
        }),
    );
}

#[test]
fn status_missing_ready_rejected() {
    validate_fails(
        "status.schema.json",
        &json!({
            "type": "STATUS",
            "id": "RX-1A2B3C",
            "busy": false,
            "alarm": false,
            "time": 123456
        }),
    );
}

#[test]
fn status_time_as_float_rejected() {
    validate_fails(
        "status.schema.json",
        &json!({
            "type": "STATUS",
            "id": "RX-1A2B3C",
            "busy": false,
            "alarm": false,
            "ready": true,
            "time": 123.5
        }),
    );
}

#[test]
fn status_busy_as_string_rejected() {
    validate_fails(
        "status.schema.json",
        &json!({
            "type": "STATUS",
            "id": "RX-1A2B3C",
            "busy": "no",
            "alarm": false,
            "ready": true,
            "time": 123456
        }),
    );
}

#[test]
fn status_wrong_id_prefix_rejected() {
    validate_fails(
        "status.schema.json",
        &json!({
            "type": "STATUS",
            "id": "TX-1A2B3C",
            "busy": false,
            "alarm": false,
            "ready": true,
            "time": 123456
        }),
    );
}

#[test]
fn status_extra_field_rejected() {
    validate_fails(
        "status.schema.json",
        &json!({
            "type": "STATUS",
            "id": "RX-1A2B3C",
            "busy": false,
            "alarm": false,
            "ready": true,
            "time": 123456,
            "rssi": -42
        }),
    );
}

// =========================================================================
// Inbound motion
// =========================================================================

#[test]
fn motion_minimal() {
    validate("motion.schema.json", &json!({ "type": "MOTION" }));
}

#[test]
fn motion_with_sensor_fields() {
    // Transmitters may attach sensor details; the receiver ignores them.
    validate(
        "motion.schema.json",
        &json!({ "type": "MOTION", "sensor": 3, "battery": 87 }),
    );
}

#[test]
fn motion_wrong_type_rejected() {
    validate_fails("motion.schema.json", &json!({ "type": "PING" }));
}

#[test]
fn motion_missing_type_rejected() {
    validate_fails("motion.schema.json", &json!({ "sensor": 3 }));
}

// =========================================================================
// MQTT motion alert
// =========================================================================

#[test]
fn motion_alert_valid() {
    validate(
        "motion_alert.schema.json",
        &json!({
            "now": 1756200000000_u64,
            "op": "MOTION_ALERT",
            "id": "RX-1A2B3C",
            "count": 4,
            "rssi": -63,
            "uptime": "2m 5s",
            "payload": "{\"type\":\"MOTION\"}"
        }),
    );
}

#[test]
fn motion_alert_zero_count_rejected() {
    // An alert is only pushed after a confirmed event, so count starts at 1.
    validate_fails(
        "motion_alert.schema.json",
        &json!({
            "now": 1756200000000_u64,
            "op": "MOTION_ALERT",
            "id": "RX-1A2B3C",
            "count": 0,
            "rssi": -63,
            "uptime": "2m 5s",
            "payload": "{\"type\":\"MOTION\"}"
        }),
    );
}

#[test]
fn motion_alert_wrong_op_rejected() {
    validate_fails(
        "motion_alert.schema.json",
        &json!({
            "now": 1756200000000_u64,
            "op": "ALERT",
            "id": "RX-1A2B3C",
            "count": 1,
            "rssi": -63,
            "uptime": "5s",
            "payload": "{}"
        }),
    );
}

#[test]
fn motion_alert_missing_uptime_rejected() {
    validate_fails(
        "motion_alert.schema.json",
        &json!({
            "now": 1756200000000_u64,
            "op": "MOTION_ALERT",
            "id": "RX-1A2B3C",
            "count": 1,
            "rssi": -63,
            "payload": "{}"
        }),
    );
}
