//! Host configuration.
//!
//! Stored as KDL, one node per setting, e.g.:
//!
//! ```kdl
//! content-min-height 20
//! line-height-threshold 20
//! density-dpi 320
//! asset-base-url "file:///android_asset/"
//! stylesheet "html/caret-bridge.css"
//! script "html/caret-bridge.js"
//! ```
//!
//! Missing nodes keep their defaults.

use std::path::Path;

use kdl::{KdlDocument, KdlValue};

use crate::error::HostError;
use crate::units::{DEFAULT_DENSITY_DPI, dp_to_px};

#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// Minimum height of the editable container, in dp.
    pub content_min_height_dp: f32,
    /// Approximate line height used when deciding whether the caret is visible, in dp.
    pub line_height_threshold_dp: f32,
    /// Screen density of the device.
    pub density_dpi: f32,
    /// Base URL the page is loaded with; asset paths are relative to it.
    pub asset_base_url: String,
    pub stylesheet: String,
    pub script: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            content_min_height_dp: 20.0,
            line_height_threshold_dp: 20.0,
            density_dpi: DEFAULT_DENSITY_DPI,
            asset_base_url: "file:///android_asset/".to_owned(),
            stylesheet: "html/caret-bridge.css".to_owned(),
            script: "html/caret-bridge.js".to_owned(),
        }
    }
}

impl HostConfig {
    /// Parse a config from KDL source.
    pub fn from_kdl_str(source: &str) -> Result<Self, HostError> {
        let doc: KdlDocument = source.parse()?;
        let mut config = Self::default();

        if let Some(v) = number(&doc, "content-min-height")? {
            config.content_min_height_dp = v;
        }
        if let Some(v) = number(&doc, "line-height-threshold")? {
            config.line_height_threshold_dp = v;
        }
        if let Some(v) = number(&doc, "density-dpi")? {
            config.density_dpi = v;
        }
        if let Some(v) = string(&doc, "asset-base-url")? {
            config.asset_base_url = v;
        }
        if let Some(v) = string(&doc, "stylesheet")? {
            config.stylesheet = v;
        }
        if let Some(v) = string(&doc, "script")? {
            config.script = v;
        }

        tracing::debug!(target: "caret_bridge::host", ?config, "loaded host config");
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| HostError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_kdl_str(&source)
    }

    /// Scale factor from CSS pixels to device pixels.
    pub fn density(&self) -> f32 {
        self.density_dpi / DEFAULT_DENSITY_DPI
    }

    pub fn content_min_height_px(&self) -> u32 {
        dp_to_px(self.content_min_height_dp, self.density_dpi) as u32
    }

    pub fn line_height_threshold_px(&self) -> i32 {
        dp_to_px(self.line_height_threshold_dp, self.density_dpi) as i32
    }
}

fn first_value<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a KdlValue> {
    doc.get(name)?.entries().first().map(|e| e.value())
}

fn number(doc: &KdlDocument, name: &str) -> Result<Option<f32>, HostError> {
    let Some(value) = first_value(doc, name) else {
        return Ok(None);
    };
    value
        .as_f64()
        .or_else(|| value.as_i64().map(|v| v as f64))
        .map(|v| Some(v as f32))
        .ok_or_else(|| HostError::InvalidValue {
            node: name.to_owned(),
            expected: "a number",
        })
}

fn string(doc: &KdlDocument, name: &str) -> Result<Option<String>, HostError> {
    let Some(value) = first_value(doc, name) else {
        return Ok(None);
    };
    value
        .as_string()
        .map(|s| Some(s.to_owned()))
        .ok_or_else(|| HostError::InvalidValue {
            node: name.to_owned(),
            expected: "a string",
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = HostConfig::from_kdl_str("").unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.density(), 1.0);
        assert_eq!(config.content_min_height_px(), 20);
    }

    #[test]
    fn test_overrides() {
        let config = HostConfig::from_kdl_str(
            r#"
            content-min-height 40
            density-dpi 320
            script "js/bridge.js"
            line-height-threshold 12.5
            "#,
        )
        .unwrap();
        assert_eq!(config.content_min_height_dp, 40.0);
        assert_eq!(config.density(), 2.0);
        assert_eq!(config.content_min_height_px(), 80);
        assert_eq!(config.line_height_threshold_px(), 25);
        assert_eq!(config.script, "js/bridge.js");
        assert_eq!(config.stylesheet, HostConfig::default().stylesheet);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let err = HostConfig::from_kdl_str("density-dpi \"high\"").unwrap_err();
        assert!(matches!(
            err,
            HostError::InvalidValue { ref node, expected: "a number" } if node == "density-dpi"
        ));
    }

    #[test]
    fn test_invalid_kdl() {
        assert!(matches!(
            HostConfig::from_kdl_str("stylesheet \"unterminated"),
            Err(HostError::Kdl(_))
        ));
    }

    #[test]
    fn test_load_is_logged_under_host_target() {
        use std::sync::{Arc, Mutex};

        use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

        #[derive(Clone, Default)]
        struct Targets(Arc<Mutex<Vec<String>>>);

        impl<S: tracing::Subscriber> Layer<S> for Targets {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                self.0.lock().unwrap().push(event.metadata().target().to_owned());
            }
        }

        let targets = Targets::default();
        let subscriber = tracing_subscriber::registry().with(targets.clone());
        tracing::subscriber::with_default(subscriber, || {
            HostConfig::from_kdl_str("density-dpi 240").unwrap();
        });

        let seen = targets.0.lock().unwrap();
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|t| t == "caret_bridge::host"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = HostConfig::load("/nonexistent/caret-bridge.kdl").unwrap_err();
        assert!(matches!(err, HostError::Io { .. }));
    }
}
