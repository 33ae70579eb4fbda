//! Snapping configuration.

use peniko::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default search radius in coordinate units.
pub const DEFAULT_TOLERANCE: u32 = 4;

/// Configuration errors, raised when a config is built or loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Snap tolerance must not be negative, got {0}")]
    NegativeTolerance(i64),
    #[error("Snap tolerance {0} is out of range")]
    ToleranceOutOfRange(i64),
    #[error("Config parse error: {0}")]
    Parse(String),
}

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

fn default_stroke_width() -> f64 {
    0.5
}

fn default_dash() -> Vec<f64> {
    vec![10.0, 10.0]
}

fn default_margin() -> f64 {
    20.0
}

fn default_inset() -> f64 {
    5.0
}

/// How guide lines should look. Rendering is up to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideStyle {
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default = "SerializableColor::black")]
    pub stroke_color: SerializableColor,
    /// Dash pattern (on, off, ...). Empty for a solid line.
    #[serde(default = "default_dash")]
    pub dash: Vec<f64>,
    /// Distance from the furthest participant edge to a spacing bracket.
    #[serde(default = "default_margin")]
    pub margin: f64,
    /// Gap between a shape edge and the end of a spacing bracket.
    #[serde(default = "default_inset")]
    pub inset: f64,
}

impl Default for GuideStyle {
    fn default() -> Self {
        Self {
            stroke_width: default_stroke_width(),
            stroke_color: SerializableColor::black(),
            dash: default_dash(),
            margin: default_margin(),
            inset: default_inset(),
        }
    }
}

impl GuideStyle {
    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }

    /// Set the stroke color from a peniko Color.
    pub fn set_stroke(&mut self, color: Color) {
        self.stroke_color = color.into();
    }
}

fn default_true() -> bool {
    true
}

fn default_tolerance() -> i64 {
    i64::from(DEFAULT_TOLERANCE)
}

/// On-disk shape of [`SnapConfig`], validated on conversion.
#[derive(Debug, Deserialize)]
struct SnapConfigFile {
    #[serde(default = "default_tolerance")]
    tolerance: i64,
    #[serde(default = "default_true")]
    snap_enabled: bool,
    #[serde(default = "default_true")]
    guide_lines_enabled: bool,
    #[serde(default)]
    guide_style: GuideStyle,
}

impl TryFrom<SnapConfigFile> for SnapConfig {
    type Error = ConfigError;

    fn try_from(file: SnapConfigFile) -> Result<Self, Self::Error> {
        Ok(Self {
            tolerance: validate_tolerance(file.tolerance)?,
            snap_enabled: file.snap_enabled,
            guide_lines_enabled: file.guide_lines_enabled,
            guide_style: file.guide_style,
        })
    }
}

fn validate_tolerance(tolerance: i64) -> Result<u32, ConfigError> {
    if tolerance < 0 {
        return Err(ConfigError::NegativeTolerance(tolerance));
    }
    u32::try_from(tolerance).map_err(|_| ConfigError::ToleranceOutOfRange(tolerance))
}

/// Snapping behavior for one alignment index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapConfigFile")]
pub struct SnapConfig {
    tolerance: u32,
    snap_enabled: bool,
    guide_lines_enabled: bool,
    guide_style: GuideStyle,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            snap_enabled: true,
            guide_lines_enabled: true,
            guide_style: GuideStyle::default(),
        }
    }
}

impl SnapConfig {
    /// Build a config, rejecting a negative tolerance.
    pub fn new(
        tolerance: i64,
        snap_enabled: bool,
        guide_lines_enabled: bool,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            tolerance: validate_tolerance(tolerance)?,
            snap_enabled,
            guide_lines_enabled,
            guide_style: GuideStyle::default(),
        })
    }

    /// Load a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Search radius in coordinate units.
    pub fn tolerance(&self) -> u32 {
        self.tolerance
    }

    pub fn set_tolerance(&mut self, tolerance: i64) -> Result<(), ConfigError> {
        self.tolerance = validate_tolerance(tolerance)?;
        Ok(())
    }

    /// Whether matches may alter the drag delta.
    pub fn snap_enabled(&self) -> bool {
        self.snap_enabled
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.snap_enabled = enabled;
    }

    /// Whether matches are forwarded to the guide renderer.
    pub fn guide_lines_enabled(&self) -> bool {
        self.guide_lines_enabled
    }

    pub fn set_guide_lines_enabled(&mut self, enabled: bool) {
        self.guide_lines_enabled = enabled;
    }

    pub fn guide_style(&self) -> &GuideStyle {
        &self.guide_style
    }

    pub fn guide_style_mut(&mut self) -> &mut GuideStyle {
        &mut self.guide_style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SnapConfig::default();
        assert_eq!(config.tolerance(), 4);
        assert!(config.snap_enabled());
        assert!(config.guide_lines_enabled());
        assert_eq!(config.guide_style().dash, vec![10.0, 10.0]);
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        assert_eq!(
            SnapConfig::new(-1, true, true),
            Err(ConfigError::NegativeTolerance(-1))
        );
        let mut config = SnapConfig::default();
        assert!(config.set_tolerance(-3).is_err());
        assert_eq!(config.tolerance(), 4);
        config.set_tolerance(0).unwrap();
        assert_eq!(config.tolerance(), 0);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = SnapConfig::from_json(r#"{ "tolerance": 8 }"#).unwrap();
        assert_eq!(config.tolerance(), 8);
        assert!(config.snap_enabled());
        assert_eq!(config.guide_style(), &GuideStyle::default());
    }

    #[test]
    fn test_from_json_rejects_negative_tolerance() {
        let err = SnapConfig::from_json(r#"{ "tolerance": -2 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(msg) if msg.contains("negative")));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            SnapConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = SnapConfig::new(6, false, true).unwrap();
        config.guide_style_mut().set_stroke(Color::from_rgba8(255, 0, 0, 255));
        let json = config.to_json().unwrap();
        let back = SnapConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.guide_style().stroke_color, SerializableColor::new(255, 0, 0, 255));
        let rgba = back.guide_style().stroke().to_rgba8();
        assert_eq!((rgba.r, rgba.g, rgba.b, rgba.a), (255, 0, 0, 255));
    }
}
