use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Tuning for the 3-D relax pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub iterations: usize,
    pub sphere_radius: f32,
    pub repulsion: f32,
    pub spring: f32,
    pub damping: f32,
    pub max_speed: f32,
    pub softening: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            iterations: 100,
            sphere_radius: 160.0,
            repulsion: 6_000.0,
            spring: 0.02,
            damping: 0.85,
            max_speed: 12.0,
            softening: 1.0,
        }
    }
}

impl SimulationParams {
    /// Separation at which one spring balances the repulsion of its two ends.
    pub fn rest_distance(&self) -> f32 {
        (self.repulsion / self.spring.max(f32::EPSILON)).cbrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    /// Radians per second around the vertical axis.
    pub auto_rotate_speed: f32,
    /// Radians per dragged pixel.
    pub drag_sensitivity: f32,
    pub focal_length: f32,
    pub pitch_limit: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            auto_rotate_speed: 0.25,
            drag_sensitivity: 0.008,
            focal_length: 600.0,
            pitch_limit: 1.4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitParams {
    pub ring_radii: [f32; 3],
    pub min_edge_width: f32,
    pub max_edge_width: f32,
    pub max_curvature: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for OrbitParams {
    fn default() -> Self {
        Self {
            ring_radii: [90.0, 165.0, 240.0],
            min_edge_width: 1.0,
            max_edge_width: 6.0,
            max_curvature: 0.35,
            min_zoom: 0.4,
            max_zoom: 3.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub simulation: SimulationParams,
    pub camera: CameraParams,
    pub orbit: OrbitParams,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        let simulation = &self.simulation;
        ensure!(
            simulation.damping > 0.0 && simulation.damping < 1.0,
            "simulation.damping must be in (0, 1), got {}",
            simulation.damping
        );
        ensure!(
            simulation.spring > 0.0 && simulation.repulsion > 0.0,
            "simulation.spring and simulation.repulsion must be positive"
        );
        ensure!(
            simulation.max_speed > 0.0 && simulation.sphere_radius > 0.0,
            "simulation.max_speed and simulation.sphere_radius must be positive"
        );
        ensure!(
            self.camera.focal_length > 0.0,
            "camera.focal_length must be positive"
        );
        ensure!(
            self.orbit.min_zoom > 0.0 && self.orbit.min_zoom <= self.orbit.max_zoom,
            "orbit zoom limits are inverted"
        );
        Ok(())
    }
}

pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: EngineConfig = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"simulation":{"iterations":40}}"#).expect("valid");
        assert_eq!(config.simulation.iterations, 40);
        assert_eq!(config.simulation.damping, SimulationParams::default().damping);
        assert_eq!(config.camera, CameraParams::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn damping_outside_unit_interval_is_rejected() {
        let mut config = EngineConfig::default();
        config.simulation.damping = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_path_means_defaults() {
        assert_eq!(load_config(None).expect("defaults"), EngineConfig::default());
    }

    #[test]
    fn rest_distance_balances_forces() {
        let params = SimulationParams::default();
        let distance = params.rest_distance();
        let repulsion = params.repulsion / (distance * distance);
        let spring = params.spring * distance;
        assert!((repulsion - spring).abs() < 1e-3);
    }
}
