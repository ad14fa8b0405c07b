//! Renderer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};
use crate::map::{LineStyle, TileLayer};
use crate::polyline::{DEFAULT_PRECISION, MAX_PRECISION};

/// Strava v3 listing of the authenticated athlete's activities.
pub const DEFAULT_ENDPOINT: &str = "https://www.strava.com/api/v3/athlete/activities";

/// Configuration for fetching and drawing routes.
///
/// Every field has a default, so a JSON config file only needs the keys it
/// wants to override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Activities endpoint, queried with `access_token`, `page` and `per_page`.
    /// Default: Strava v3 athlete activities
    pub endpoint: String,

    /// Base tile layer added before routes are drawn.
    /// Default: OpenStreetMap
    pub tile_layer: TileLayer,

    /// Style applied to every route.
    /// Default: green, weight 5, opacity 0.7, round joins
    pub style: LineStyle,

    /// Decimal digits of the encoded polylines, at most 10.
    /// Default: 5
    pub precision: u32,

    /// Whole-request timeout. Default: none
    pub timeout_secs: Option<u64>,

    /// Sent as the `User-Agent` header.
    pub user_agent: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            tile_layer: TileLayer::default(),
            style: LineStyle::default(),
            precision: DEFAULT_PRECISION,
            timeout_secs: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl RendererConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| RenderError::Config(e.to_string()))?;
        config.validate().map_err(RenderError::Config)?;
        Ok(config)
    }

    /// Check values serde cannot rule out on its own.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.precision > MAX_PRECISION {
            return Err(format!(
                "precision {} is not supported (max {} digits)",
                self.precision, MAX_PRECISION
            ));
        }
        Ok(())
    }

    /// Load a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| RenderError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::LineJoin;

    #[test]
    fn test_defaults() {
        let config = RendererConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.precision, 5);
        assert_eq!(config.timeout_secs, None);
        assert_eq!(config.style.color, "green");
        assert_eq!(config.style.line_join, LineJoin::Round);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RendererConfig::from_json(
            r#"{"endpoint": "http://localhost:9000/activities", "style": {"color": "red"}}"#,
        )
        .unwrap();
        assert_eq!(config.endpoint, "http://localhost:9000/activities");
        assert_eq!(config.style.color, "red");
        assert_eq!(config.style.weight, 5.0);
        assert_eq!(config.tile_layer, TileLayer::default());
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = RendererConfig::from_json(r#"{"precision": "five"}"#).unwrap_err();
        assert!(matches!(err, RenderError::Config(_)));
    }

    #[test]
    fn test_precision_bounds() {
        assert_eq!(RendererConfig::from_json(r#"{"precision": 10}"#).unwrap().precision, 10);
        let err = RendererConfig::from_json(r#"{"precision": 11}"#).unwrap_err();
        assert!(matches!(err, RenderError::Config(ref msg) if msg.contains("precision 11")));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = RendererConfig::from_json_file("/nonexistent/activity-routes.json").unwrap_err();
        assert!(matches!(err, RenderError::Config(_)));
    }
}
