//! Default envelopes for freshly created experiments.

use super::{Envelope, ExperimentRecord, ExperimentType, Summary};
use serde_json::{Map, Value, json};

/// Extension of save files.
pub const SAV_EXTENSION: &str = "sav";
/// Extension of the preview image the application stores next to a save.
pub const PREVIEW_EXTENSION: &str = "jpg";

/// Application build the templates mimic.
const APP_VERSION: i64 = 2404;

/// Initial `StatusSave` of a celestial experiment, carried as-is afterwards.
const CELESTIAL_STATUS: &str = r#"{"MainIdentifier":null,"Elements":{},"WorldTime":0.0,"ScalingName":"内太阳系","LengthScale":1.0,"SizeLinear":0.0001,"SizeNonlinear":0.5,"StarPresent":false,"Setting":null}"#;

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl Summary {
    /// Empty summary for an experiment of the given type.
    pub fn template(experiment_type: ExperimentType) -> Self {
        Self {
            subject: None,
            description: None,
            tags: vec![format!("Type-{}", experiment_type.value())],
            creation_date: 0,
            extra: object(json!({
                "Type": experiment_type.value(),
                "ParentID": null,
                "ParentName": null,
                "ParentCategory": null,
                "ContentID": null,
                "Editor": null,
                "Coauthors": [],
                "LocalizedDescription": null,
                "ModelID": null,
                "ModelName": null,
                "ModelTags": [],
                "Version": 0,
                "Language": null,
                "Visits": 0,
                "Stars": 0,
                "Supports": 0,
                "Remixes": 0,
                "Comments": 0,
                "Price": 0,
                "Popularity": 0,
                "UpdateDate": 0,
                "SortingDate": 0,
                "ID": null,
                "Category": null,
                "LocalizedSubject": null,
                "Image": 0,
                "ImageRegion": 0,
                "User": {
                    "ID": null,
                    "Nickname": null,
                    "Signature": null,
                    "Avatar": 0,
                    "AvatarRegion": 0,
                    "Decoration": 0,
                    "Verification": null
                },
                "Visibility": 0,
                "Settings": {},
                "Multilingual": false
            })),
        }
    }
}

impl Envelope {
    /// Default envelope for a new experiment of the given type.
    ///
    /// `CameraSave` is left empty and filled in when the experiment is
    /// written. So is `StatusSave`, except for celestial experiments whose
    /// payload is never modeled.
    pub fn template(experiment_type: ExperimentType) -> Self {
        let components = match experiment_type {
            ExperimentType::Circuit => 7,
            ExperimentType::Celestial | ExperimentType::Electromagnetism => 0,
        };
        let status_save = match experiment_type {
            ExperimentType::Celestial => CELESTIAL_STATUS.to_string(),
            _ => String::new(),
        };
        Self {
            experiment_type,
            experiment: ExperimentRecord {
                id: None,
                experiment_type,
                components,
                subject: None,
                status_save,
                camera_save: String::new(),
                version: APP_VERSION,
                creation_date: 0,
                paused: false,
                extra: object(json!({
                    "Summary": null,
                    "Plots": null
                })),
            },
            id: None,
            summary: Some(Summary::template(experiment_type)),
            creation_date: 0,
            internal_name: String::new(),
            paused: false,
            extra: object(json!({
                "Speed": 1.0,
                "SpeedMinimum": 0.0002,
                "SpeedMaximum": 2.0,
                "SpeedReal": 0.0,
                "Version": 0,
                "CameraSnapshot": null,
                "Plots": [],
                "Widgets": [],
                "WidgetGroups": [],
                "Bookmarks": {},
                "Interfaces": {
                    "Play-Expanded": false,
                    "Chart-Expanded": false
                }
            })),
        }
    }
}
