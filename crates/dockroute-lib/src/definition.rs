use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{Error, Result};

const DEFAULT_PAD_OFFSET: f32 = 150.0;

/// How ships dock with a station type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DockMethod {
    /// Ground station; ships land on pads and lift off without a departure route.
    Surface,
    /// Space station; ships fly in through a gate and out again.
    Orbital,
}

/// Contents of a station definition file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StationDefinition {
    #[serde(default)]
    pub model: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub angular_velocity: f32,
    #[serde(default)]
    pub parking_distance: f32,
    #[serde(default)]
    pub parking_gap_size: f32,
    #[serde(default = "default_pad_offset")]
    pub pad_offset: f32,
}

fn default_pad_offset() -> f32 {
    DEFAULT_PAD_OFFSET
}

impl StationDefinition {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a definition file, reporting parse failures against its path.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|err| Error::InvalidDefinition {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn dock_method(&self) -> Result<DockMethod> {
        self.kind
            .parse::<DockMethod>()
            .map_err(|_| Error::UnknownDockMethod {
                value: self.kind.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let def = StationDefinition::from_json(r#"{"model": "ring", "type": "orbital"}"#).unwrap();
        assert_eq!(def.model, "ring");
        assert_eq!(def.dock_method().unwrap(), DockMethod::Orbital);
        assert_eq!(def.angular_velocity, 0.0);
        assert_eq!(def.pad_offset, 150.0);
    }

    #[test]
    fn all_fields_are_read() {
        let def = StationDefinition::from_json(
            r#"{
                "model": "outpost",
                "type": "surface",
                "angular_velocity": 0.1,
                "parking_distance": 5000,
                "parking_gap_size": 500,
                "pad_offset": 75
            }"#,
        )
        .unwrap();
        assert_eq!(def.dock_method().unwrap(), DockMethod::Surface);
        assert_eq!(def.parking_distance, 5000.0);
        assert_eq!(def.parking_gap_size, 500.0);
        assert_eq!(def.pad_offset, 75.0);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let def = StationDefinition::from_json(r#"{"model": "m", "type": "floating"}"#).unwrap();
        let err = def.dock_method().unwrap_err();
        assert!(matches!(err, Error::UnknownDockMethod { value } if value == "floating"));
    }
}
