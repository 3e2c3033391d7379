//! Integration tests for the simulated device
//!
//! These tests load the shipped simulation documents and verify end-to-end
//! behavior:
//! - Fixed response overrides and fallback acknowledgements
//! - Rule-driven responses stay within their candidate values
//! - Generator cadence, isolation and cancellation through the device facade

use std::sync::Arc;
use std::time::Duration;

use devsim_engine::{
    AttributeSink, AttributeStore, CommandInvoker, SimulatedDevice, WaveformGenerator,
};
use devsim_model::document::load_document;
use devsim_model::{SimError, SimulationConfig, SinkError};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    pub const WEATHER: &str = include_str!("../../../configs/weather.json");
    pub const POWER_SUPPLY: &str = include_str!("../../../configs/power_supply.json");

    pub fn weather() -> SimulationConfig {
        load_document(WEATHER).unwrap()
    }

    pub fn power_supply() -> SimulationConfig {
        load_document(POWER_SUPPLY).unwrap()
    }

    /// Parse `LABEL: a:-1\tb:-2\t` into the label and its values
    pub fn parse_rule_response(response: &str) -> (String, Vec<(String, i64)>) {
        let (label, body) = response.split_once(": ").unwrap();
        let values = body
            .split('\t')
            .filter(|f| !f.is_empty())
            .map(|f| {
                let (name, value) = f.split_once(":-").unwrap();
                (name.to_string(), value.parse().unwrap())
            })
            .collect();
        (label.to_string(), values)
    }

    /// Store that fails writes for one attribute
    pub struct FlakyStore {
        pub inner: AttributeStore,
        pub broken: String,
    }

    impl AttributeSink for FlakyStore {
        fn write(&self, attribute: &str, value: f64) -> Result<(), SinkError> {
            if attribute == self.broken {
                return Err(SinkError::new(attribute, "device offline"));
            }
            self.inner.write(attribute, value)
        }
    }
}

// ============================================================================
// Command responses
// ============================================================================

#[test]
fn weather_commands_with_fixed_response() {
    let device = SimulatedDevice::new(helpers::weather());

    let cases = [
        ("ON", r#"{"fixedResponse":{"Response":"RES_ON","msg":0},"ON":[]}"#, "RES_ON:-msg:0||"),
        ("OFF", r#"{"OFF":[],"fixedResponse":{"Response":"RES_OFF","msg":0}}"#, "RES_OFF:-msg:0||"),
        ("RESET", r#"{"RESET":[],"fixedResponse":{"Response":"RES_RESET","msg":0}}"#, "RES_RESET:-msg:0||"),
    ];
    for (command, payload, expected) in cases {
        assert_eq!(device.invoke(command, payload).unwrap(), expected);
    }
}

#[test]
fn weather_commands_without_override_are_deterministic() {
    let device = SimulatedDevice::new(helpers::weather());

    assert_eq!(device.invoke("ON", r#"{"ON":[]}"#).unwrap(), "RES_ON: msg:-0\t");
    assert_eq!(device.invoke("OFF", r#"{"OFF":[]}"#).unwrap(), "RES_OFF: msg:-0\t");
    assert_eq!(device.invoke("RESET", r#"{"RESET":[]}"#).unwrap(), "RES_RESET: msg:-0\t");
}

#[test]
fn unknown_and_empty_commands_are_acknowledged() {
    let device = SimulatedDevice::new(helpers::power_supply());

    assert_eq!(
        device.invoke("SENDCMD", r#"{"SENDCMD":[]}"#).unwrap(),
        "RESPONSE RECEIVED FOR SENDCMD"
    );
    assert_eq!(device.invoke("Status", "").unwrap(), "RESPONSE RECEIVED FOR STATUS");
}

#[test]
fn rule_driven_values_stay_in_candidate_set() {
    let device = SimulatedDevice::with_seed(helpers::power_supply(), 1234);

    for _ in 0..200 {
        let (label, values) = helpers::parse_rule_response(&device.invoke("ON", "").unwrap());
        assert_eq!(label, "RES_ON");
        assert_eq!(values.len(), 2);
        assert_eq!(values[0], ("msg".to_string(), 0));
        assert_eq!(values[1].0, "setpoint");
        assert!([5, 0, 30, 12, 24].contains(&values[1].1));
    }
}

#[test]
fn later_response_groups_are_not_consulted() {
    let device = SimulatedDevice::new(helpers::power_supply());

    for _ in 0..50 {
        let (label, values) = helpers::parse_rule_response(&device.invoke("RESET", "").unwrap());
        assert_eq!(label, "RES_RESET");
        assert!([0, 1].contains(&values[0].1));
    }
}

#[test]
fn request_faults_reach_the_caller() {
    let device = SimulatedDevice::new(helpers::weather());

    assert!(matches!(device.invoke("ON", "{oops"), Err(SimError::Parse(_))));
    assert!(matches!(
        device.invoke("ON", r#"{"fixedResponse":{"msg":0}}"#),
        Err(SimError::Config(_))
    ));

    // The device keeps answering after a fault
    assert_eq!(device.invoke("ON", "").unwrap(), "RES_ON: msg:-0\t");
}

// ============================================================================
// Attribute generation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn every_weather_attribute_updates() {
    let mut device = SimulatedDevice::new(helpers::weather());
    device.start();

    tokio::time::sleep(Duration::from_millis(1000)).await;

    for name in device.attribute_names() {
        let reading = device.read_attribute(name).unwrap();
        assert!(reading.writes >= 9, "{name} only saw {} writes", reading.writes);
    }

    let exits = device.shutdown().await;
    assert_eq!(exits.len(), 7);
    assert!(exits.iter().all(|e| e.reason == SimError::Canceled));
}

#[tokio::test(start_paused = true)]
async fn values_stay_near_configured_range() {
    let mut device = SimulatedDevice::new(helpers::weather());
    let mut updates = device.store().subscribe();
    device.start();

    let config = helpers::weather();
    for _ in 0..70 {
        let update = updates.recv().await.unwrap();
        let spec = config.attribute(&update.attribute).unwrap();
        let amp = spec.amplitude().abs();
        assert!(update.value >= spec.min_value - amp - 1e-9);
        assert!(update.value <= spec.min_value + amp + 1e-9);
    }

    device.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn failing_sink_only_stops_its_attribute() {
    let config = Arc::new(helpers::weather());
    let store = Arc::new(helpers::FlakyStore {
        inner: AttributeStore::from_config(&config),
        broken: "Pressure".to_string(),
    });

    let handle = WaveformGenerator::new(config.clone(), store.clone()).start();
    tokio::time::sleep(Duration::from_millis(1000)).await;

    assert_eq!(handle.is_finished("Pressure"), Some(true));
    assert_eq!(store.inner.read("Pressure").unwrap().writes, 0);
    assert_eq!(store.inner.read("Pressure").unwrap().value, 800.0);
    for attr in config.attributes().iter().filter(|a| a.name != "Pressure") {
        assert_eq!(handle.is_finished(&attr.name), Some(false));
        assert!(store.inner.read(&attr.name).unwrap().writes >= 9);
    }

    let exits = handle.shutdown().await;
    let pressure = exits.iter().find(|e| e.attribute == "Pressure").unwrap();
    assert!(matches!(pressure.reason, SimError::Sink(_)));
}

#[tokio::test(start_paused = true)]
async fn shutdown_freezes_readings() {
    let mut device = SimulatedDevice::new(helpers::power_supply());
    device.start();
    tokio::time::sleep(Duration::from_millis(600)).await;

    device.shutdown().await;
    let frozen = device.read_attribute("Voltage").unwrap();

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(device.read_attribute("Voltage").unwrap(), frozen);
}
