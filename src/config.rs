use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/constellation.yaml";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub layout: LayoutConfig,
    pub focus: FocusConfig,
    pub picking: PickingConfig,
    pub updates: UpdateConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub push_path: String,
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_owned(),
            push_path: "/constellation/ws".to_owned(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Number of most-connected nodes rendered as the primary tier.
    pub primary_tier_size: usize,
    pub outer_shell_radius: f32,
    pub inner_shell_min_radius: f32,
    pub inner_shell_max_radius: f32,
    /// Engine seconds the force simulation runs after each ingest.
    pub simulation_secs: f32,
    pub repulsion: f32,
    pub softening: f32,
    pub centering: f32,
    pub spring: f32,
    pub spring_length: f32,
    pub damping: f32,
    pub max_speed: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Radians per second of idle view rotation; zero disables it.
    pub ambient_rotation_speed: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            primary_tier_size: 25,
            outer_shell_radius: 380.0,
            inner_shell_min_radius: 60.0,
            inner_shell_max_radius: 240.0,
            simulation_secs: 5.0,
            repulsion: 42_000.0,
            softening: 400.0,
            centering: 0.0025,
            spring: 0.012,
            spring_length: 120.0,
            damping: 0.9,
            max_speed: 18.0,
            viewport_width: 1400.0,
            viewport_height: 900.0,
            ambient_rotation_speed: 0.02,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    pub duration_secs: f32,
    pub reset_duration_secs: f32,
    pub history_limit: usize,
    pub min_ring_size: usize,
    pub ring_base_radius: f32,
    pub ring_radius_growth: f32,
    pub ring_angle_offset: f32,
    pub depth_spread: f32,
    pub zoom_near: f32,
    pub zoom_medium: f32,
    pub zoom_far: f32,
    pub dim_opacity: f32,
    pub faded_opacity: f32,
    pub secondary_opacity: f32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            duration_secs: 0.8,
            reset_duration_secs: 0.6,
            history_limit: 10,
            min_ring_size: 8,
            ring_base_radius: 150.0,
            ring_radius_growth: 0.6,
            ring_angle_offset: 0.3,
            depth_spread: 48.0,
            zoom_near: 1.35,
            zoom_medium: 1.0,
            zoom_far: 0.7,
            dim_opacity: 0.35,
            faded_opacity: 0.06,
            secondary_opacity: 0.45,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    pub base_radius: f32,
    pub importance_scale: f32,
    pub drag_threshold_px: f32,
    pub click_max_secs: f64,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            base_radius: 6.0,
            importance_scale: 12.0,
            drag_threshold_px: 4.0,
            click_max_secs: 0.2,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    pub max_reconnect_attempts: u32,
    pub reconnect_base_delay_ms: u64,
    pub build_fallback_secs: f64,
    pub auto_build_min_sources: usize,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: 3,
            reconnect_base_delay_ms: 1_000,
            build_fallback_secs: 180.0,
            auto_build_min_sources: 3,
        }
    }
}

impl Config {
    /// Reads `path`, or the default location when it exists, falling back to built-in values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !default.exists() {
                    tracing::debug!("no config file found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config = serde_yaml::from_str(raw).context("config is not valid YAML")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            "backend:\n  base_url: http://example.test:9000\nfocus:\n  history_limit: 4\n",
        )
        .expect("config parses");

        assert_eq!(config.backend.base_url, "http://example.test:9000");
        assert_eq!(config.backend.push_path, "/constellation/ws");
        assert_eq!(config.focus.history_limit, 4);
        assert_eq!(config.focus.min_ring_size, 8);
        assert_eq!(config.layout.primary_tier_size, 25);
        assert_eq!(config.updates.max_reconnect_attempts, 3);
    }

    #[test]
    fn empty_yaml_is_default() {
        let config = Config::from_yaml("{}").expect("config parses");
        assert_eq!(config.picking.click_max_secs, 0.2);
        assert_eq!(config.updates.build_fallback_secs, 180.0);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(Config::from_yaml("layout:\n  simulation_secs: fast\n").is_err());
    }
}
