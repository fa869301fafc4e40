use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// A single reading as reported by the meter adapter.
///
/// The gateway encodes quantities as JSON strings (`"123.45"`, or the
/// literal `"NaN"` for a meter that has not reported yet); some firmware
/// revisions emit bare numbers instead. Both forms deserialize into
/// `Reading`, which keeps the raw text so the NaN sentinel survives.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading(String);

impl<'de> serde::Deserialize<'de> for Reading {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(d)?;

        match value {
            Value::String(s) => Ok(Reading(s)),
            Value::Number(n) => Ok(Reading(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number reading, got: {}",
                other
            ))),
        }
    }
}

impl Reading {
    pub fn new(raw: &str) -> Reading {
        Reading(raw.to_string())
    }

    /// `"NaN"` in any case, the adapter's way of saying "no data yet".
    pub fn is_nan(&self) -> bool {
        self.0.eq_ignore_ascii_case("nan")
    }

    /// Numeric value of the reading. `"NaN"` normalizes to `0`; text that
    /// parses as neither a number nor NaN yields no value.
    pub fn value(&self) -> Option<f64> {
        if self.is_nan() {
            return Some(0.0);
        }
        self.0.parse().ok()
    }
}

/// Quantity and flow fields a channel can read from a device record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    GasFlow,
    GasQuantity,
    ElectricityFlow,
    ElectricityQuantity,
    HeatQuantity,
    WaterFlow,
    WaterQuantity,
}

/// One entry of the device list. Every field is optional on the wire; which
/// ones are present depends on the meter kind wired to the adapter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceRecord {
    #[serde(rename = "type", default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "CurrentGasFlow", default)]
    pub current_gas_flow: Option<Reading>,
    #[serde(rename = "CurrentGasQuantity", default)]
    pub current_gas_quantity: Option<Reading>,
    #[serde(rename = "CurrentElectricityFlow", default)]
    pub current_electricity_flow: Option<Reading>,
    #[serde(rename = "CurrentElectricityQuantity", default)]
    pub current_electricity_quantity: Option<Reading>,
    #[serde(rename = "CurrentHeatQuantity", default)]
    pub current_heat_quantity: Option<Reading>,
    #[serde(rename = "CurrentWaterFlow", default)]
    pub current_water_flow: Option<Reading>,
    #[serde(rename = "CurrentWaterQuantity", default)]
    pub current_water_quantity: Option<Reading>,
}

impl DeviceRecord {
    /// Safe accessor for a quantity/flow field; a missing field stays absent
    /// instead of defaulting to a sentinel string.
    pub fn reading(&self, field: Field) -> Option<&Reading> {
        match field {
            Field::GasFlow => self.current_gas_flow.as_ref(),
            Field::GasQuantity => self.current_gas_quantity.as_ref(),
            Field::ElectricityFlow => self.current_electricity_flow.as_ref(),
            Field::ElectricityQuantity => self.current_electricity_quantity.as_ref(),
            Field::HeatQuantity => self.current_heat_quantity.as_ref(),
            Field::WaterFlow => self.current_water_flow.as_ref(),
            Field::WaterQuantity => self.current_water_quantity.as_ref(),
        }
    }
}

/// The full device list response, keyed by opaque device ids ("dev_3.2",
/// "dev_4.export", ...).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceList(pub HashMap<String, DeviceRecord>);

impl DeviceList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DeviceRecord> {
        self.0.get(id)
    }

    pub fn iter(&self) -> std::collections::hash_map::Iter<String, DeviceRecord> {
        self.0.iter()
    }
}

#[cfg(test)]
mod test {
    use super::{DeviceList, Field, Reading};
    use std::fs;
    use std::path::PathBuf;

    fn read_resource(filename: &str) -> String {
        let mut d = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        d.push(format!("resources/test/{}", filename));
        fs::read_to_string(d.as_path()).unwrap()
    }

    #[test]
    fn get_devices() {
        let input = read_resource("getDevices.json");
        let output: DeviceList = serde_json::from_str(&input).unwrap();

        let gas = output.get("dev_2.1").unwrap();
        assert_eq!(Some("HAE_METER_v3_1"), gas.device_type.as_deref());
        assert_eq!(
            Some(5.0),
            gas.reading(Field::GasQuantity).unwrap().value().map(|v| v / 1000.0)
        );

        /* Unknown attributes on a record (uuid, ccList, ...) are ignored. */
        let root = output.get("dev_2").unwrap();
        assert_eq!(Some("HAE_METER_v3"), root.device_type.as_deref());
        assert!(root.reading(Field::GasQuantity).is_none());
    }

    #[test]
    fn reading_from_bare_number() {
        let output: DeviceList =
            serde_json::from_str(r#"{"dev_1": {"CurrentElectricityFlow": 450}}"#).unwrap();
        let reading = output
            .get("dev_1")
            .unwrap()
            .reading(Field::ElectricityFlow)
            .unwrap();
        assert_eq!(Some(450.0), reading.value());
    }

    #[test]
    fn reading_nan_any_case() {
        assert!(Reading::new("NaN").is_nan());
        assert!(Reading::new("nan").is_nan());
        assert!(Reading::new("NAN").is_nan());
        assert_eq!(Some(0.0), Reading::new("NaN").value());
    }

    #[test]
    fn reading_unparsable() {
        assert_eq!(None, Reading::new("n/a").value());
    }

    #[test]
    fn invalid_json() {
        let input = read_resource("invalid_json.json");
        let output: Result<DeviceList, _> = serde_json::from_str(&input);
        assert!(output.is_err());
    }
}
