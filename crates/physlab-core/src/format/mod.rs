//! Save file format.
//!
//! A save file is one JSON object (the envelope). Two of its fields,
//! `Experiment.StatusSave` and `Experiment.CameraSave`, are themselves JSON
//! documents encoded as strings; that double encoding is part of the format
//! the application reads and is reproduced as-is. Fields the library does not
//! interpret are kept in `extra` maps so a read/write cycle preserves them.

mod status;
mod template;

pub use status::{ElementRecord, StatusPayload, WireRecord};
pub use template::{PREVIEW_EXTENSION, SAV_EXTENSION};

use crate::error::{ExperimentError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind of experiment a save file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ExperimentType {
    #[default]
    Circuit,
    Celestial,
    Electromagnetism,
}

impl ExperimentType {
    /// Numeric `Type` tag used in save files.
    pub fn value(self) -> u8 {
        match self {
            ExperimentType::Circuit => 0,
            ExperimentType::Celestial => 3,
            ExperimentType::Electromagnetism => 4,
        }
    }

    /// Whether status payloads of this type carry wires.
    pub fn has_wires(self) -> bool {
        self == ExperimentType::Circuit
    }

    /// Whether elements of this type are modeled (as opposed to carried verbatim).
    pub fn models_elements(self) -> bool {
        self != ExperimentType::Celestial
    }
}

impl From<ExperimentType> for u8 {
    fn from(value: ExperimentType) -> Self {
        value.value()
    }
}

impl TryFrom<u8> for ExperimentType {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(ExperimentType::Circuit),
            3 => Ok(ExperimentType::Celestial),
            4 => Ok(ExperimentType::Electromagnetism),
            other => Err(format!("unknown experiment type {}", other)),
        }
    }
}

impl fmt::Display for ExperimentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExperimentType::Circuit => "circuit",
            ExperimentType::Celestial => "celestial",
            ExperimentType::Electromagnetism => "electromagnetism",
        };
        f.write_str(name)
    }
}

/// The outer persisted structure of a save file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope {
    #[serde(rename = "Type")]
    pub experiment_type: ExperimentType,
    pub experiment: ExperimentRecord,
    #[serde(rename = "ID", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: Option<Summary>,
    #[serde(default)]
    pub creation_date: i64,
    /// Display name shown by the application; used to find documents.
    #[serde(default)]
    pub internal_name: String,
    #[serde(default)]
    pub paused: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `Experiment` record inside the envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExperimentRecord {
    #[serde(rename = "ID", default)]
    pub id: Option<String>,
    #[serde(rename = "Type")]
    pub experiment_type: ExperimentType,
    #[serde(default)]
    pub components: i64,
    #[serde(default)]
    pub subject: Option<String>,
    /// JSON-encoded [`StatusPayload`].
    #[serde(default)]
    pub status_save: String,
    /// JSON-encoded camera record.
    #[serde(default)]
    pub camera_save: String,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub creation_date: i64,
    #[serde(default)]
    pub paused: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Publication summary: title, description, tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Summary {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub description: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub creation_date: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// Parse save file text.
    ///
    /// Files exported by the application contain only the `Experiment`
    /// record; those are wrapped into the default envelope of their type.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(map) = value else {
            return Err(ExperimentError::Format("save file is not a JSON object".to_string()));
        };

        if map.contains_key("Experiment") {
            let mut envelope: Envelope = serde_json::from_value(Value::Object(map))?;
            if envelope.summary.is_none() {
                envelope.summary = Some(Summary::template(envelope.experiment_type));
            }
            Ok(envelope)
        } else {
            let record: ExperimentRecord = serde_json::from_value(Value::Object(map))?;
            let mut envelope = Envelope::template(record.experiment_type);
            envelope.experiment = record;
            Ok(envelope)
        }
    }

    /// Serialize as pretty-printed save file text.
    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.internal_name
    }

    /// Set the display name in both places the application reads it.
    pub fn set_name(&mut self, name: &str) {
        self.internal_name = name.to_string();
        self.summary_mut().subject = Some(name.to_string());
    }

    pub fn summary_mut(&mut self) -> &mut Summary {
        let experiment_type = self.experiment_type;
        self.summary
            .get_or_insert_with(|| Summary::template(experiment_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experiment_type_tags() {
        for t in [
            ExperimentType::Circuit,
            ExperimentType::Celestial,
            ExperimentType::Electromagnetism,
        ] {
            assert_eq!(ExperimentType::try_from(t.value()).unwrap(), t);
        }
        assert!(ExperimentType::try_from(1).is_err());
    }

    #[test]
    fn test_template_roundtrip_preserves_extras() {
        let mut envelope = Envelope::template(ExperimentType::Circuit);
        envelope.set_name("Roundtrip");
        let text = envelope.to_text().unwrap();
        let back = Envelope::parse(&text).unwrap();

        assert_eq!(back, envelope);
        assert_eq!(back.name(), "Roundtrip");
        assert!(back.extra.contains_key("SpeedMinimum"));
        assert!(back.extra.contains_key("Interfaces"));
    }

    #[test]
    fn test_parse_experiment_only_export() {
        let text = r#"{"ID":null,"Type":4,"Components":0,"Subject":null,
            "StatusSave":"{\"SimulationSpeed\":1.0,\"Elements\":[]}",
            "CameraSave":"{\"Mode\":0,\"Distance\":3.25,\"VisionCenter\":\"0,0.88,0\",\"TargetRotation\":\"90,0,0\"}",
            "Version":2404,"CreationDate":0,"Paused":false,"Summary":null,"Plots":null}"#;
        let envelope = Envelope::parse(text).unwrap();
        assert_eq!(envelope.experiment_type, ExperimentType::Electromagnetism);
        assert_eq!(envelope.experiment.version, 2404);
        assert!(envelope.summary.is_some());
    }

    #[test]
    fn test_parse_null_summary_and_bom() {
        let mut envelope = Envelope::template(ExperimentType::Circuit);
        envelope.summary = None;
        let text = format!("\u{feff}{}", envelope.to_text().unwrap());
        let back = Envelope::parse(&text).unwrap();
        assert!(back.summary.is_some());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(matches!(Envelope::parse("[1, 2]"), Err(ExperimentError::Format(_))));
        assert!(matches!(Envelope::parse("not json"), Err(ExperimentError::Json(_))));
    }
}
