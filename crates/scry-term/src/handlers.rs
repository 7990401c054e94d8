//! Per-kind element views
//!
//! One handler per element kind, registered into a dispatch table. Each
//! view is a single line of text; the screen layer decides colors and focus
//! markers.

use scry_client::{Dispatch, ElementHandler, Emission, InputAction};
use scry_core::{Element, ElementId, Widget};

const GAUGE_WIDTH: usize = 20;

/// One rendered element line
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// The element this line displays
    pub id: ElementId,
    /// Line content, without focus decoration
    pub text: String,
    /// Whether the element reacts to input
    pub interactive: bool,
}

impl Line {
    fn new(element: &Element, text: String) -> Self {
        Self {
            id: element.id.clone(),
            text,
            interactive: element.widget.is_interactive(),
        }
    }
}

/// Build the dispatch table with every stock handler registered
///
/// Elements of a kind with no handler render through the fallback: a
/// diagnostic line naming the unrecognized tag.
pub fn dispatch_table() -> Dispatch<Line> {
    let mut table = Dispatch::new(|element: &Element| Line {
        id: element.id.clone(),
        text: format!("?? unsupported element kind \"{}\"", element.kind()),
        interactive: false,
    });

    table.register(SliderView);
    table.register(MarkdownView);
    table.register(ButtonView);
    table.register(CheckboxView);
    table.register(ImageView);
    table
}

/// Numeric gauge; drag with arrow keys, emission coalesced
pub struct SliderView;

impl ElementHandler<Line> for SliderView {
    fn kind(&self) -> &'static str {
        "Slider"
    }

    fn view(&self, element: &Element) -> Line {
        let Widget::Slider { value, min, max } = &element.widget else {
            return Line::new(element, "??".to_string());
        };

        let span = max - min;
        let ratio = if span > 0.0 {
            ((value - min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let filled = (ratio * GAUGE_WIDTH as f64).round() as usize;
        let bar = "█".repeat(filled) + &"░".repeat(GAUGE_WIDTH - filled);

        Line::new(element, format!("[{bar}] {value:.1}"))
    }

    fn on_input(&self, element: &Element, action: InputAction) -> Option<Emission> {
        let Widget::Slider { min, max, .. } = &element.widget else {
            return None;
        };

        match action {
            InputAction::SetValue(v) => Some(Emission::coalesced(v.clamp(*min, *max))),
            InputAction::Activate => None,
        }
    }
}

/// Read-only text; never emits
pub struct MarkdownView;

impl ElementHandler<Line> for MarkdownView {
    fn kind(&self) -> &'static str {
        "Markdown"
    }

    fn view(&self, element: &Element) -> Line {
        let Widget::Markdown { md } = &element.widget else {
            return Line::new(element, "??".to_string());
        };

        // Single-line display; further lines collapse into the first
        let text = md.lines().collect::<Vec<_>>().join(" ⏎ ");
        Line::new(element, text)
    }
}

/// Momentary control; activation emits the sentinel immediately
pub struct ButtonView;

impl ElementHandler<Line> for ButtonView {
    fn kind(&self) -> &'static str {
        "Button"
    }

    fn view(&self, element: &Element) -> Line {
        let Widget::Button { label } = &element.widget else {
            return Line::new(element, "??".to_string());
        };

        Line::new(element, format!("[ {label} ]"))
    }

    fn on_input(&self, _element: &Element, action: InputAction) -> Option<Emission> {
        match action {
            InputAction::Activate => Some(Emission::activation()),
            InputAction::SetValue(_) => None,
        }
    }
}

/// Boolean toggle; activation emits the new value immediately
pub struct CheckboxView;

impl ElementHandler<Line> for CheckboxView {
    fn kind(&self) -> &'static str {
        "Checkbox"
    }

    fn view(&self, element: &Element) -> Line {
        let Widget::Checkbox { value, label } = &element.widget else {
            return Line::new(element, "??".to_string());
        };

        let mark = if *value { 'x' } else { ' ' };
        Line::new(element, format!("[{mark}] {label}"))
    }

    fn on_input(&self, element: &Element, action: InputAction) -> Option<Emission> {
        let Widget::Checkbox { value, .. } = &element.widget else {
            return None;
        };

        match action {
            InputAction::Activate => Some(Emission::immediate(!value)),
            InputAction::SetValue(_) => None,
        }
    }
}

/// Image placeholder; activation emits the sentinel immediately
pub struct ImageView;

impl ElementHandler<Line> for ImageView {
    fn kind(&self) -> &'static str {
        "Image"
    }

    fn view(&self, element: &Element) -> Line {
        let Widget::Image { src } = &element.widget else {
            return Line::new(element, "??".to_string());
        };

        Line::new(element, format!("(image: {src})"))
    }

    fn on_input(&self, _element: &Element, action: InputAction) -> Option<Emission> {
        match action {
            InputAction::Activate => Some(Emission::activation()),
            InputAction::SetValue(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::echo::LocalEcho;
    use scry_client::EmitPolicy;
    use scry_core::{ChangeValue, UiState};

    fn checkbox(id: &str, value: bool) -> Element {
        Element::new(
            id,
            Widget::Checkbox {
                value,
                label: "Notify".to_string(),
            },
        )
    }

    #[test]
    fn test_slider_gauge_view() {
        let table = dispatch_table();
        let element = Element::new(
            "s1",
            Widget::Slider {
                value: 5.0,
                min: 0.0,
                max: 10.0,
            },
        );

        let line = table.view(&element);
        assert!(line.interactive);
        assert!(line.text.contains("█"));
        assert!(line.text.ends_with("5.0"));
    }

    #[test]
    fn test_button_emits_sentinel_immediately() {
        let table = dispatch_table();
        let element = Element::new("b1", Widget::Button { label: "Go".into() });

        let emission = table.input(&element, InputAction::Activate).unwrap();
        assert_eq!(emission.policy, EmitPolicy::Immediate);
        assert!(emission.value.is_activation());
    }

    #[test]
    fn test_checkbox_toggles_through_local_echo() {
        let table = dispatch_table();
        let state = UiState::new().with_element(checkbox("c1", false));
        let mut echo = LocalEcho::new();

        // First click: the displayed value is false, so the new value is true
        let effective = echo.effective_state(&state);
        let first = table
            .input(effective.get(&"c1".into()).unwrap(), InputAction::Activate)
            .unwrap();
        assert_eq!(first.policy, EmitPolicy::Immediate);
        assert_eq!(first.value, ChangeValue::Bool(true));
        echo.set("c1".into(), first.value);

        // Second click before any snapshot: display shows true, emit false
        let effective = echo.effective_state(&state);
        let second = table
            .input(effective.get(&"c1".into()).unwrap(), InputAction::Activate)
            .unwrap();
        assert_eq!(second.value, ChangeValue::Bool(false));
    }

    #[test]
    fn test_slider_input_is_coalesced_and_clamped() {
        let table = dispatch_table();
        let element = Element::new(
            "s1",
            Widget::Slider {
                value: 5.0,
                min: 0.0,
                max: 10.0,
            },
        );

        let emission = table
            .input(&element, InputAction::SetValue(42.0))
            .unwrap();
        assert_eq!(emission.policy, EmitPolicy::Coalesced);
        assert_eq!(emission.value, ChangeValue::Number(10.0));
    }

    #[test]
    fn test_unknown_kind_renders_fallback_beside_siblings() {
        let table = dispatch_table();
        let state = UiState::new()
            .with_element(Element::new(
                "x1",
                Widget::Unknown {
                    kind: "Foo".into(),
                    data: serde_json::json!({}),
                },
            ))
            .with_element(Element::new(
                "s1",
                Widget::Slider {
                    value: 1.0,
                    min: 0.0,
                    max: 2.0,
                },
            ));

        let lines = table.walk(&state);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].text.contains("Foo"));
        assert!(!lines[0].interactive);
        assert!(lines[1].text.contains("█"));
    }

    #[test]
    fn test_markdown_never_emits() {
        let table = dispatch_table();
        let element = Element::new("m1", Widget::Markdown { md: "# Hi".into() });

        assert!(table.input(&element, InputAction::Activate).is_none());
        assert!(!table.view(&element).interactive);
    }
}
