//! Camera module for the experiment view.
//!
//! The camera is persisted as its own JSON document inside the envelope's
//! `CameraSave` string, with vectors written as (X, Z, Y) triples.

use crate::error::Result;
use crate::format::ExperimentType;
use crate::position::parse_triple;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Camera state of an experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// View mode tag as stored by the application.
    pub mode: i64,
    /// Distance from the observer to the vision center.
    pub distance: f64,
    /// Point being looked at, in (X, Y, Z) order.
    pub vision_center: [f64; 3],
    /// Observer rotation in degrees, in (X, Y, Z) order.
    pub target_rotation: [f64; 3],
    /// Fields of the camera record this type does not model.
    extra: Map<String, Value>,
}

/// Wire form of `CameraSave`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CameraRecord {
    mode: i64,
    distance: f64,
    vision_center: String,
    target_rotation: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::for_type(ExperimentType::Circuit)
    }
}

impl Camera {
    /// Default view for a freshly created experiment of the given type.
    pub fn for_type(experiment_type: ExperimentType) -> Self {
        let (mode, distance, vision_center, target_rotation) = match experiment_type {
            ExperimentType::Circuit => (0, 2.7, [0.0, -0.45, 1.08], [50.0, 0.0, 0.0]),
            ExperimentType::Celestial => (2, 2.75, [0.0, 0.0, 1.08], [90.0, 0.0, 0.0]),
            ExperimentType::Electromagnetism => (0, 3.25, [0.0, 0.0, 0.88], [90.0, 0.0, 0.0]),
        };
        Self {
            mode,
            distance,
            vision_center,
            target_rotation,
            extra: Map::new(),
        }
    }

    /// Decode a `CameraSave` string.
    pub fn from_camera_save(text: &str) -> Result<Self> {
        let record: CameraRecord = serde_json::from_str(text)?;
        let [cx, cz, cy] = parse_triple(&record.vision_center)?;
        let [rx, rz, ry] = parse_triple(&record.target_rotation)?;
        Ok(Self {
            mode: record.mode,
            distance: record.distance,
            vision_center: [cx, cy, cz],
            target_rotation: [rx, ry, rz],
            extra: record.extra,
        })
    }

    /// Encode as a `CameraSave` string.
    pub fn to_camera_save(&self) -> Result<String> {
        let [cx, cy, cz] = self.vision_center;
        let [rx, ry, rz] = self.target_rotation;
        let record = CameraRecord {
            mode: self.mode,
            distance: self.distance,
            vision_center: format!("{},{},{}", cx, cz, cy),
            target_rotation: format!("{},{},{}", rx, rz, ry),
            extra: self.extra.clone(),
        };
        Ok(serde_json::to_string(&record)?)
    }

    /// Point the camera at `center`.
    pub fn look_at(&mut self, center: [f64; 3]) {
        self.vision_center = center;
    }

    pub fn set_distance(&mut self, distance: f64) {
        self.distance = distance;
    }

    pub fn set_target_rotation(&mut self, rotation: [f64; 3]) {
        self.target_rotation = rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::default();
        assert_eq!(camera.mode, 0);
        assert!((camera.distance - 2.7).abs() < f64::EPSILON);
        assert_eq!(camera.target_rotation, [50.0, 0.0, 0.0]);
    }

    #[test]
    fn test_decode_swaps_axes() {
        let text = r#"{"Mode":0,"Distance":2.7,"VisionCenter":"0.3623461,1.08,-0.4681728","TargetRotation":"50,0,0"}"#;
        let camera = Camera::from_camera_save(text).unwrap();
        assert_eq!(camera.vision_center, [0.3623461, -0.4681728, 1.08]);
        assert_eq!(camera.target_rotation, [50.0, 0.0, 0.0]);
    }

    #[test]
    fn test_roundtrip_keeps_precision_and_extras() {
        let text = r#"{"Mode":2,"Distance":3.5,"VisionCenter":"0.3623461,1.08,-0.4681728","TargetRotation":"90,0,12","Locked":true}"#;
        let camera = Camera::from_camera_save(text).unwrap();
        let back = Camera::from_camera_save(&camera.to_camera_save().unwrap()).unwrap();
        assert_eq!(back, camera);

        let value: Value = serde_json::from_str(&camera.to_camera_save().unwrap()).unwrap();
        assert_eq!(value["VisionCenter"], "0.3623461,1.08,-0.4681728");
        assert_eq!(value["Locked"], true);
    }

    #[test]
    fn test_observe_setters() {
        let mut camera = Camera::for_type(ExperimentType::Electromagnetism);
        camera.look_at([1.0, 2.0, 3.0]);
        camera.set_distance(5.0);
        camera.set_target_rotation([10.0, 20.0, 30.0]);

        let value: Value = serde_json::from_str(&camera.to_camera_save().unwrap()).unwrap();
        assert_eq!(value["VisionCenter"], "1,3,2");
        assert_eq!(value["TargetRotation"], "10,30,20");
        assert_eq!(value["Distance"], 5.0);
    }
}
