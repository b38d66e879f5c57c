//! The `StatusSave` payload: element and wire records.

use crate::elements::{Element, ElementId, ElementKind, LOCK_PROPERTY, PinRef};
use crate::error::{ExperimentError, Result};
use crate::position::{Position, Rotation};
use crate::wire::{Wire, WireColor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

fn default_simulation_speed() -> f64 {
    1.0
}

/// Decoded `StatusSave` of circuit and electromagnetism experiments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusPayload {
    #[serde(default = "default_simulation_speed")]
    pub simulation_speed: f64,
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
    /// Present for circuit experiments only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wires: Option<Vec<WireRecord>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatusPayload {
    pub fn new(simulation_speed: f64, with_wires: bool) -> Self {
        Self {
            simulation_speed,
            elements: Vec::new(),
            wires: with_wires.then(Vec::new),
            extra: Map::new(),
        }
    }

    pub fn decode(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// One element as stored in a status payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    #[serde(rename = "ModelID")]
    pub model_id: String,
    #[serde(rename = "Identifier")]
    pub identifier: String,
    #[serde(rename = "Properties", default)]
    pub properties: Map<String, Value>,
    /// `"x,z,y"` triple.
    #[serde(rename = "Position")]
    pub position: String,
    /// `"x,z,y"` triple.
    #[serde(rename = "Rotation")]
    pub rotation: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ElementRecord {
    pub fn from_element(element: &Element) -> Self {
        Self {
            model_id: element.kind().model_id().to_string(),
            identifier: element.id().to_string(),
            properties: element
                .properties()
                .iter()
                .map(|(key, value)| (key.clone(), Value::from(*value)))
                .collect(),
            position: element.position().to_external(),
            rotation: element.rotation().to_external(),
            extra: element.extras().clone(),
        }
    }

    /// Rebuild the element, keeping its stored identifier.
    ///
    /// Loaded elements are always locked, matching what the application does
    /// when it opens a save.
    pub fn into_element(self) -> Result<Element> {
        let kind = ElementKind::from_model_id(&self.model_id)
            .ok_or_else(|| ExperimentError::UnknownModel(self.model_id.clone()))?;
        let position = Position::from_external(&self.position)?;
        let rotation = Rotation::from_external(&self.rotation)?;

        let mut properties = BTreeMap::new();
        for (key, value) in self.properties {
            let number = value.as_f64().ok_or_else(|| {
                ExperimentError::Format(format!(
                    "property {} of {} is not numeric",
                    key, self.identifier
                ))
            })?;
            properties.insert(key, number);
        }
        properties.insert(LOCK_PROPERTY.to_string(), 1.0);

        Ok(Element::reconstruct(
            ElementId::from(self.identifier),
            kind,
            position,
            rotation,
            properties,
            self.extra,
        ))
    }
}

/// One wire as stored in a status payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireRecord {
    pub source: String,
    pub source_pin: u32,
    pub target: String,
    pub target_pin: u32,
    pub color_name: String,
}

impl WireRecord {
    pub fn from_wire(wire: &Wire) -> Self {
        Self {
            source: wire.source.element.to_string(),
            source_pin: wire.source.pin,
            target: wire.target.element.to_string(),
            target_pin: wire.target.pin,
            color_name: wire.color.color_name(),
        }
    }

    /// Split into pin references and a parsed color.
    pub fn into_parts(self) -> Result<(PinRef, PinRef, WireColor)> {
        let color = self.color_name.parse::<WireColor>()?;
        Ok((
            PinRef::new(ElementId::from(self.source), self.source_pin),
            PinRef::new(ElementId::from(self.target), self.target_pin),
            color,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const STORED: &str = r#"{"SimulationSpeed":1.0,"Elements":[{"ModelID":"Logic Input","Identifier":"a1","IsBroken":false,"IsLocked":false,"Properties":{"高电平":3.0,"低电平":0.0,"锁定":0.0,"开关":1.0},"Statistics":{"电流":0.0,"电压":0.0,"功率":0.0},"Position":"0.1,0.5,0.2","Rotation":"0,180,0","DiagramCached":false,"DiagramPosition":{"X":0,"Y":0,"Magnitude":0.0},"DiagramRotation":0}],"Wires":[{"Source":"a1","SourcePin":0,"Target":"b2","TargetPin":0,"ColorName":"蓝色导线"}]}"#;

    #[test]
    fn test_decode_stored_payload() {
        let status = StatusPayload::decode(STORED).unwrap();
        assert_eq!(status.elements.len(), 1);
        assert_eq!(status.wires.as_ref().map(Vec::len), Some(1));

        let element = status.elements[0].clone().into_element().unwrap();
        assert_eq!(element.kind(), ElementKind::LogicInput);
        assert_eq!(element.id().as_str(), "a1");
        // Stored (x, z, y) becomes internal (x, y, z).
        assert_eq!(element.position(), Position::new(0.1, 0.2, 0.5));
        assert_eq!(element.rotation(), Rotation::new(0.0, 0.0, 180.0));
        assert_eq!(element.property(LOCK_PROPERTY), Some(1.0));
        assert_eq!(element.property("开关"), Some(1.0));
        assert!(element.extras().contains_key("DiagramPosition"));
    }

    #[test]
    fn test_element_record_roundtrip() {
        let status = StatusPayload::decode(STORED).unwrap();
        let element = status.elements[0].clone().into_element().unwrap();
        let record = ElementRecord::from_element(&element);

        assert_eq!(record.position, "0.1,0.5,0.2");
        assert_eq!(record.rotation, "0,180,0");
        assert_eq!(record.extra, status.elements[0].extra);
    }

    #[test]
    fn test_unknown_model() {
        let record = ElementRecord {
            model_id: "Warp Core".to_string(),
            identifier: "x".to_string(),
            properties: Map::new(),
            position: "0,0,0".to_string(),
            rotation: "0,0,0".to_string(),
            extra: Map::new(),
        };
        assert!(matches!(record.into_element(), Err(ExperimentError::UnknownModel(_))));
    }

    #[test]
    fn test_wire_record_parts() {
        let record: WireRecord = serde_json::from_value(json!({
            "Source": "a", "SourcePin": 1, "Target": "b", "TargetPin": 2, "ColorName": "绿色导线"
        }))
        .unwrap();
        let (source, target, color) = record.into_parts().unwrap();
        assert_eq!(source, PinRef::new(ElementId::from("a"), 1));
        assert_eq!(target, PinRef::new(ElementId::from("b"), 2));
        assert_eq!(color, WireColor::Green);
    }

    #[test]
    fn test_payload_without_wires_omits_field() {
        let status = StatusPayload::new(1.0, false);
        let value: Value = serde_json::from_str(&status.encode().unwrap()).unwrap();
        assert!(value.get("Wires").is_none());
        assert_eq!(value["SimulationSpeed"], 1.0);
    }
}
