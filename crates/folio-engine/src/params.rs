//! Typed parameters, extracted after schema validation

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::ActionKind;
use crate::error::{Error, Result};
use crate::position::Anchor;

/// Deserialize a task's parameter map into `T`, naming the action on failure
pub fn extract<T: DeserializeOwned>(kind: ActionKind, parameters: &Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(parameters.clone()))
        .map_err(|e| Error::validation(kind.as_str(), e.to_string()))
}

/// What kind of value `request_input` asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Password,
    #[default]
    Text,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestFilesParams {
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestInputParams {
    pub reason: String,
    #[serde(default, rename = "type")]
    pub kind: InputKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompressParams {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "strong".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RotateParams {
    #[serde(default = "default_pages")]
    pub pages: String,
    /// Read as a number so `90.0` is accepted alongside `90`
    pub angle: f64,
}

impl RotateParams {
    /// The angle as whole degrees: one of 90, 180 or 270
    pub fn degrees(&self) -> Result<u16> {
        [90u16, 180, 270]
            .into_iter()
            .find(|d| f64::from(*d) == self.angle)
            .ok_or_else(|| {
                Error::validation(
                    ActionKind::Rotate.as_str(),
                    format!("angle must be 90, 180 or 270, got {}", self.angle),
                )
            })
    }
}

fn default_pages() -> String {
    "all".to_string()
}

/// Page label style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageNumberFormat {
    /// `3`
    #[default]
    #[serde(rename = "n")]
    Number,
    /// `3 of 10`
    #[serde(rename = "n_of_N")]
    NumberOfTotal,
}

impl PageNumberFormat {
    pub fn label(&self, page: usize, total: usize) -> String {
        match self {
            PageNumberFormat::Number => page.to_string(),
            PageNumberFormat::NumberOfTotal => format!("{} of {}", page, total),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageNumberParams {
    #[serde(default = "Anchor::bottom_center")]
    pub position: Anchor,
    #[serde(default)]
    pub format: PageNumberFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatermarkParams {
    pub text: String,
    #[serde(default = "default_watermark_size")]
    pub font_size: f32,
    #[serde(default = "default_watermark_opacity")]
    pub opacity: f32,
    #[serde(default = "default_watermark_rotation")]
    pub rotation: f32,
}

fn default_watermark_size() -> f32 {
    50.0
}

fn default_watermark_opacity() -> f32 {
    0.3
}

fn default_watermark_rotation() -> f32 {
    45.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordParams {
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddTextParams {
    pub text: String,
    pub page: u32,
    #[serde(default = "default_text_size")]
    pub font_size: f32,
    #[serde(default)]
    pub position: Anchor,
}

fn default_text_size() -> f32 {
    12.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhiteoutParams {
    pub page: u32,
    #[serde(default)]
    pub position: Anchor,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnsupportedParams {
    #[serde(default)]
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_rotate_angle_accepts_float_form() {
        let p: RotateParams = extract(ActionKind::Rotate, &map(json!({"angle": 90.0}))).unwrap();
        assert_eq!(p.pages, "all");
        assert_eq!(p.degrees().unwrap(), 90);

        let p: RotateParams = extract(ActionKind::Rotate, &map(json!({"angle": 270}))).unwrap();
        assert_eq!(p.degrees().unwrap(), 270);
    }

    #[test]
    fn test_rotate_angle_off_the_quarter_turns_fails() {
        for angle in [json!(45), json!(90.5), json!(360)] {
            let p: RotateParams =
                extract(ActionKind::Rotate, &map(json!({"angle": angle}))).unwrap();
            let err = p.degrees().unwrap_err();
            assert!(err.to_string().contains("rotate"), "{err}");
        }
    }

    #[test]
    fn test_watermark_defaults() {
        let p: WatermarkParams = extract(ActionKind::Watermark, &map(json!({"text": "X"}))).unwrap();
        assert_eq!(p.font_size, 50.0);
        assert_eq!(p.opacity, 0.3);
        assert_eq!(p.rotation, 45.0);
    }

    #[test]
    fn test_request_input_defaults_to_text() {
        let p: RequestInputParams =
            extract(ActionKind::RequestInput, &map(json!({"reason": "name?"}))).unwrap();
        assert_eq!(p.kind, InputKind::Text);
        let p: RequestInputParams = extract(
            ActionKind::RequestInput,
            &map(json!({"reason": "pw", "type": "password"})),
        )
        .unwrap();
        assert_eq!(p.kind, InputKind::Password);
    }

    #[test]
    fn test_page_number_format_labels() {
        let p: PageNumberParams =
            extract(ActionKind::AddPageNumbers, &map(json!({"format": "n_of_N"}))).unwrap();
        assert_eq!(p.position, Anchor::BottomCenter);
        assert_eq!(p.format.label(2, 7), "2 of 7");
        assert_eq!(PageNumberFormat::Number.label(2, 7), "2");
    }

    #[test]
    fn test_unknown_position_falls_back_to_center() {
        let p: AddTextParams = extract(
            ActionKind::AddText,
            &map(json!({"text": "hi", "page": 1, "position": "upper-ish"})),
        )
        .unwrap();
        assert_eq!(p.position, Anchor::Center);
        assert_eq!(p.font_size, 12.0);
    }

    #[test]
    fn test_missing_field_names_action() {
        let err = extract::<PasswordParams>(ActionKind::Protect, &Map::new()).unwrap_err();
        assert!(err.to_string().starts_with("protect:"), "got: {}", err);
    }
}
