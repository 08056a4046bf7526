//! Sheet tab colors.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An RGBA color with every channel in `0.0..=1.0`.
///
/// Google Sheets omits zero channels on the wire, so missing channels
/// deserialize to 0.0 and a missing alpha to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TabColor {
    #[serde(default)]
    pub red: f64,
    #[serde(default)]
    pub green: f64,
    #[serde(default)]
    pub blue: f64,
    #[serde(default = "opaque")]
    pub alpha: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Default for TabColor {
    fn default() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl TabColor {
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    fn from_bytes([r, g, b]: [u8; 3]) -> Self {
        Self::rgb(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
        )
    }

    fn validated(self) -> Result<Self> {
        for (name, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidColor(format!(
                    "{name} channel must be between 0.0 and 1.0, not {value}"
                )));
            }
        }
        Ok(self)
    }
}

/// Named colors accepted by [`ColorSpec::Named`], as 8-bit RGB.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("aqua", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("fuchsia", [255, 0, 255]),
    ("silver", [192, 192, 192]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("dark gray", [64, 64, 64]),
    ("light gray", [211, 211, 211]),
    ("maroon", [128, 0, 0]),
    ("olive", [128, 128, 0]),
    ("purple", [128, 0, 128]),
    ("teal", [0, 128, 128]),
    ("navy", [0, 0, 128]),
    ("orange", [255, 165, 0]),
    ("pink", [255, 192, 203]),
    ("brown", [165, 42, 42]),
    ("gold", [255, 215, 0]),
    ("indigo", [75, 0, 130]),
    ("violet", [238, 130, 238]),
    ("cornflower blue", [100, 149, 237]),
];

/// Looks up a named color, ignoring case and surrounding whitespace.
pub fn named_color(name: &str) -> Option<TabColor> {
    let wanted = name.trim();
    NAMED_COLORS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(wanted))
        .map(|(_, bytes)| TabColor::from_bytes(*bytes))
}

/// The ways a caller may describe a tab color.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpec {
    /// A name such as `"red"` or `"cornflower blue"`.
    Named(String),
    Rgb(f64, f64, f64),
    Rgba(f64, f64, f64, f64),
    /// A raw color object like `{"red": 1.0, "alpha": 0.5}`; missing channels
    /// default to 0.0, alpha to 1.0.
    Raw(serde_json::Value),
}

impl ColorSpec {
    /// Resolves this specification into a concrete color.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] for unknown names, channels outside
    /// `0.0..=1.0`, or raw objects with unknown or non-numeric keys.
    pub fn resolve(&self) -> Result<TabColor> {
        match self {
            ColorSpec::Named(name) => named_color(name)
                .ok_or_else(|| Error::InvalidColor(format!("unknown color name {name:?}"))),
            ColorSpec::Rgb(r, g, b) => TabColor::rgb(*r, *g, *b).validated(),
            ColorSpec::Rgba(r, g, b, a) => TabColor::rgba(*r, *g, *b, *a).validated(),
            ColorSpec::Raw(value) => {
                let object = value.as_object().ok_or_else(|| {
                    Error::InvalidColor(
                        "value must be a color name, an RGB or RGBA tuple, or an object"
                            .to_string(),
                    )
                })?;
                let mut color = TabColor::default();
                for (key, channel) in object {
                    let channel = channel.as_f64().ok_or_else(|| {
                        Error::InvalidColor(format!("{key} must be a number, not {channel}"))
                    })?;
                    match key.as_str() {
                        "red" => color.red = channel,
                        "green" => color.green = channel,
                        "blue" => color.blue = channel,
                        "alpha" => color.alpha = channel,
                        other => {
                            return Err(Error::InvalidColor(format!(
                                "unknown color channel {other:?}"
                            )));
                        }
                    }
                }
                color.validated()
            }
        }
    }
}

impl From<&str> for ColorSpec {
    fn from(name: &str) -> Self {
        ColorSpec::Named(name.to_string())
    }
}

impl From<String> for ColorSpec {
    fn from(name: String) -> Self {
        ColorSpec::Named(name)
    }
}

impl From<(f64, f64, f64)> for ColorSpec {
    fn from((r, g, b): (f64, f64, f64)) -> Self {
        ColorSpec::Rgb(r, g, b)
    }
}

impl From<(f64, f64, f64, f64)> for ColorSpec {
    fn from((r, g, b, a): (f64, f64, f64, f64)) -> Self {
        ColorSpec::Rgba(r, g, b, a)
    }
}

impl From<TabColor> for ColorSpec {
    fn from(color: TabColor) -> Self {
        ColorSpec::Rgba(color.red, color.green, color.blue, color.alpha)
    }
}

impl From<serde_json::Value> for ColorSpec {
    fn from(value: serde_json::Value) -> Self {
        ColorSpec::Raw(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_named_color_is_case_insensitive() {
        assert_eq!(
            ColorSpec::from("Red").resolve().unwrap(),
            TabColor::rgb(1.0, 0.0, 0.0)
        );
        assert_eq!(
            ColorSpec::from("  BLACK ").resolve().unwrap(),
            TabColor::default()
        );
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let err = ColorSpec::from("blurple").resolve().unwrap_err();
        assert!(matches!(err, Error::InvalidColor(_)));
        assert!(err.to_string().contains("blurple"));
    }

    #[test]
    fn test_rgb_tuple_defaults_alpha_to_opaque() {
        let color = ColorSpec::from((0.2, 0.4, 0.6)).resolve().unwrap();
        assert_eq!(color, TabColor::rgba(0.2, 0.4, 0.6, 1.0));
    }

    #[test]
    fn test_rgba_tuple_keeps_alpha() {
        let color = ColorSpec::from((0.2, 0.4, 0.6, 0.5)).resolve().unwrap();
        assert!((color.alpha - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_channels_outside_unit_range_are_rejected() {
        assert!(ColorSpec::from((1.5, 0.0, 0.0)).resolve().is_err());
        assert!(ColorSpec::from((0.0, -0.1, 0.0)).resolve().is_err());
        assert!(ColorSpec::from((0.0, 0.0, 0.0, f64::NAN)).resolve().is_err());
    }

    #[test]
    fn test_raw_object_fills_missing_channels() {
        let color = ColorSpec::from(json!({"green": 1})).resolve().unwrap();
        assert_eq!(color, TabColor::rgba(0.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn test_raw_object_rejects_unknown_keys_and_non_numbers() {
        assert!(ColorSpec::from(json!({"purple": 1})).resolve().is_err());
        assert!(ColorSpec::from(json!({"red": "high"})).resolve().is_err());
        assert!(ColorSpec::from(json!([1, 0, 0])).resolve().is_err());
    }

    #[test]
    fn test_tab_color_deserializes_sparse_wire_format() {
        let color: TabColor = serde_json::from_value(json!({"red": 1.0})).unwrap();
        assert_eq!(color, TabColor::rgba(1.0, 0.0, 0.0, 1.0));
    }
}
