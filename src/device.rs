use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

use crate::color::{Rgb, convert};
use crate::error::Result;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Capability {
    Power,
    Brightness,
    Temperature,
    Color,
    Hardware,
    Unknown,
}

impl Capability {
    /// Decode the gateway's raw capability byte.
    ///
    /// Richer device classes imply every capability of the poorer ones, so
    /// a color bulb (0x0A) also reports temperature, brightness and power.
    pub fn from_flags(flags: u8) -> Vec<Capability> {
        use Capability::*;
        match flags {
            0x0A => vec![Color, Temperature, Brightness, Power],
            0x02 => vec![Temperature, Brightness, Power],
            0x03 => vec![Brightness, Power],
            0x04 => vec![Power],
            0x00 | 0x40 => vec![Hardware],
            _ => Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Capability::Power => "POWER",
            Capability::Brightness => "BRIGHTNESS",
            Capability::Temperature => "TEMPERATURE",
            Capability::Color => "COLOR",
            Capability::Hardware => "HARDWARE",
            Capability::Unknown => "UNKNOWN",
        }
    }
}

impl From<String> for Capability {
    fn from(s: String) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "POWER" => Capability::Power,
            "BRIGHTNESS" => Capability::Brightness,
            "TEMPERATURE" => Capability::Temperature,
            "COLOR" => Capability::Color,
            "HARDWARE" => Capability::Hardware,
            _ => Capability::Unknown,
        }
    }
}

impl From<Capability> for String {
    fn from(c: Capability) -> Self {
        c.name().to_string()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl From<DeviceColor> for Rgb {
    fn from(c: DeviceColor) -> Self {
        Rgb::new(c.red, c.green, c.blue)
    }
}

/// One entry of the gateway's device details. Optional attributes are only
/// reported for devices that support the matching capability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub firmware: String,
    #[serde(default)]
    pub online: bool,
    #[serde(default, deserialize_with = "capabilities")]
    pub capabilities: Vec<Capability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<i32>,
    /// Correlated color temperature in Kelvin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<DeviceColor>,
}

impl Device {
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Display color for the reported color temperature, if any.
    pub fn swatch(&self) -> Option<Rgb> {
        self.temperature.map(|k| convert(k as f64))
    }
}

/// Capabilities arrive either as a list of names or as the raw flag byte.
fn capabilities<'de, D>(deserializer: D) -> std::result::Result<Vec<Capability>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Names(Vec<Capability>),
        Flags(u8),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Names(names) => names,
        Raw::Flags(flags) => Capability::from_flags(flags),
    })
}

#[derive(Deserialize)]
struct Properties {
    devices: Value,
}

#[derive(Deserialize)]
struct Details {
    properties: Properties,
}

/// Parse the gateway's details document,
/// `{"properties": {"devices": [...] | {"<name>": {...}}}}`.
///
/// Devices keyed by name come back in name order. An entry that does not
/// decode is logged and left out; the rest of the list is still returned.
pub fn parse_details(json: &str) -> Result<Vec<Device>> {
    let details: Details = serde_json::from_str(json)?;
    let entries: Vec<(String, Value)> = match details.properties.devices {
        Value::Array(list) => list
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let label = v
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{i}"));
                (label, v)
            })
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .collect::<BTreeMap<_, _>>()
            .into_iter()
            .collect(),
        other => {
            return Err(serde_json::Error::custom(format!(
                "devices must be an array or an object, found {}",
                kind(&other)
            ))
            .into());
        }
    };

    Ok(entries
        .into_iter()
        .filter_map(|(label, v)| match serde_json::from_value::<Device>(v) {
            Ok(device) => Some(device),
            Err(e) => {
                warn!(device = %label, "skipping device: {e}");
                None
            }
        })
        .collect())
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
