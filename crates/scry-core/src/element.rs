//! UI element types
//!
//! Elements are described by what they ARE, not how they should look: a
//! `kind` tag selects the variant, and each variant carries only the fields
//! that are meaningful for it. Presentation crates decide the visuals.
//!
//! On the wire an element is a flat JSON object:
//!
//! ```json
//! { "id": "s1", "kind": "Slider", "visible": true, "value": 5.0, "min": 0.0, "max": 10.0 }
//! ```
//!
//! A `kind` this build does not recognize decodes into [`Widget::Unknown`]
//! with the raw fields preserved, so one unrecognized element never poisons
//! an otherwise valid snapshot.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Unique element identifier
///
/// Assigned by the server and stable across snapshots for the lifetime of
/// the element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub String);

impl ElementId {
    /// Create an id from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Element decode errors
#[derive(Debug, Error)]
pub enum ElementError {
    /// A recognized kind arrived with fields that do not match its schema
    #[error("invalid fields for element kind {kind}: {source}")]
    InvalidFields {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A single mirrored UI element
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Server-assigned identifier, unique within a snapshot
    pub id: ElementId,

    /// Whether the element should be rendered at all
    pub visible: bool,

    /// Kind-specific payload
    pub widget: Widget,
}

impl Element {
    /// Create a new visible element
    pub fn new(id: impl Into<ElementId>, widget: Widget) -> Self {
        Self {
            id: id.into(),
            visible: true,
            widget,
        }
    }

    /// Set visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// The kind tag for this element
    pub fn kind(&self) -> &str {
        self.widget.kind()
    }
}

/// Kind-specific element payload
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    /// Continuous numeric control over an inclusive range
    Slider { value: f64, min: f64, max: f64 },

    /// Read-only rendered text
    Markdown { md: String },

    /// Momentary activation control
    Button { label: String },

    /// Boolean toggle with a label
    Checkbox { value: bool, label: String },

    /// Clickable image reference
    Image { src: String },

    /// A kind this build does not recognize; raw fields preserved
    Unknown { kind: String, data: Value },
}

impl Widget {
    /// The wire tag for this widget
    pub fn kind(&self) -> &str {
        match self {
            Self::Slider { .. } => "Slider",
            Self::Markdown { .. } => "Markdown",
            Self::Button { .. } => "Button",
            Self::Checkbox { .. } => "Checkbox",
            Self::Image { .. } => "Image",
            Self::Unknown { kind, .. } => kind,
        }
    }

    /// Whether this widget ever produces change events
    pub fn is_interactive(&self) -> bool {
        !matches!(self, Self::Markdown { .. } | Self::Unknown { .. })
    }
}

// Flat wire representation: id/kind/visible plus kind-specific fields at the
// same nesting level.
#[derive(Serialize, Deserialize)]
struct RawElement {
    id: ElementId,
    kind: String,
    visible: bool,
    #[serde(flatten)]
    fields: serde_json::Map<String, Value>,
}

#[derive(Serialize, Deserialize)]
struct SliderFields {
    value: f64,
    min: f64,
    max: f64,
}

#[derive(Serialize, Deserialize)]
struct MarkdownFields {
    md: String,
}

#[derive(Serialize, Deserialize)]
struct ButtonFields {
    label: String,
}

#[derive(Serialize, Deserialize)]
struct CheckboxFields {
    value: bool,
    label: String,
}

#[derive(Serialize, Deserialize)]
struct ImageFields {
    src: String,
}

impl TryFrom<RawElement> for Element {
    type Error = ElementError;

    fn try_from(raw: RawElement) -> Result<Self, Self::Error> {
        let RawElement {
            id,
            kind,
            visible,
            fields,
        } = raw;

        let data = Value::Object(fields);
        let invalid = |kind: &str| {
            let kind = kind.to_string();
            move |source| ElementError::InvalidFields { kind, source }
        };

        let widget = match kind.as_str() {
            "Slider" => {
                let f: SliderFields =
                    serde_json::from_value(data).map_err(invalid(&kind))?;
                Widget::Slider {
                    value: f.value,
                    min: f.min,
                    max: f.max,
                }
            }
            "Markdown" => {
                let f: MarkdownFields =
                    serde_json::from_value(data).map_err(invalid(&kind))?;
                Widget::Markdown { md: f.md }
            }
            "Button" => {
                let f: ButtonFields =
                    serde_json::from_value(data).map_err(invalid(&kind))?;
                Widget::Button { label: f.label }
            }
            "Checkbox" => {
                let f: CheckboxFields =
                    serde_json::from_value(data).map_err(invalid(&kind))?;
                Widget::Checkbox {
                    value: f.value,
                    label: f.label,
                }
            }
            "Image" => {
                let f: ImageFields =
                    serde_json::from_value(data).map_err(invalid(&kind))?;
                Widget::Image { src: f.src }
            }
            _ => Widget::Unknown {
                kind: kind.clone(),
                data,
            },
        };

        Ok(Element {
            id,
            visible,
            widget,
        })
    }
}

impl From<&Element> for RawElement {
    fn from(element: &Element) -> Self {
        let fields = match &element.widget {
            Widget::Slider { value, min, max } => serde_json::to_value(SliderFields {
                value: *value,
                min: *min,
                max: *max,
            }),
            Widget::Markdown { md } => serde_json::to_value(MarkdownFields { md: md.clone() }),
            Widget::Button { label } => serde_json::to_value(ButtonFields {
                label: label.clone(),
            }),
            Widget::Checkbox { value, label } => serde_json::to_value(CheckboxFields {
                value: *value,
                label: label.clone(),
            }),
            Widget::Image { src } => serde_json::to_value(ImageFields { src: src.clone() }),
            Widget::Unknown { data, .. } => Ok(data.clone()),
        };

        let fields = match fields {
            Ok(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };

        RawElement {
            id: element.id.clone(),
            kind: element.kind().to_string(),
            visible: element.visible,
            fields,
        }
    }
}

impl Serialize for Element {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        RawElement::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawElement::deserialize(deserializer)?;
        Element::try_from(raw).map_err(serde::de::Error::custom)
    }
}
