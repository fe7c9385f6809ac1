use glam::{DVec2, IVec2};
use serde::Deserialize;

use crate::error::ConfigError;

/// Hierarchical grid: cells subdivided into a local grid of nodes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Node extent in world units.
    pub node_size: DVec2,
    /// Nodes per cell along each axis.
    pub cell_nodes: IVec2,
    pub world_origin: DVec2,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            node_size: DVec2::splat(32.0),
            cell_nodes: IVec2::splat(16),
            world_origin: DVec2::ZERO,
        }
    }
}

impl GridConfig {
    /// Cell extent in world units.
    pub fn cell_extent(&self) -> DVec2 {
        self.node_size * self.cell_nodes.as_dvec2()
    }
}

/// Zone grid: cells bucketed under coarser zones for bulk load/unload.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Cell extent in world units.
    pub cell_size: DVec2,
    /// Cells per zone along each axis.
    pub zone_cells: IVec2,
    pub world_origin: DVec2,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            cell_size: DVec2::splat(32.0),
            zone_cells: IVec2::splat(16),
            world_origin: DVec2::ZERO,
        }
    }
}

/// Partition strategy, chosen once when the world is built.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartitionConfig {
    Grid(GridConfig),
    Zone(ZoneConfig),
}

impl Default for PartitionConfig {
    fn default() -> Self {
        PartitionConfig::Grid(GridConfig::default())
    }
}

/// World-level configuration for the physics pass.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub partition: PartitionConfig,
    /// Fraction of velocity removed per second: `v *= 1 - damp_value * dt`.
    pub damp_value: f64,
    /// Speeds below this snap to zero after damping.
    pub damp_threshold: f64,
    /// Upper bound on queued move commands per entity.
    pub max_commands: usize,
    /// Enable per-step timing instrumentation (adds small overhead when true).
    pub enable_timing: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            partition: PartitionConfig::default(),
            damp_value: 4.0,
            damp_threshold: 0.8,
            max_commands: 16,
            enable_timing: false,
        }
    }
}

impl WorldConfig {
    /// Parse and validate a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let cfg: WorldConfig = toml::from_str(src)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.damp_value.is_finite() && self.damp_value >= 0.0) {
            return Err(invalid("damp_value", format!("{} is not a non-negative number", self.damp_value)));
        }
        if !(self.damp_threshold.is_finite() && self.damp_threshold >= 0.0) {
            return Err(invalid("damp_threshold", format!("{} is not a non-negative number", self.damp_threshold)));
        }
        if self.max_commands == 0 {
            return Err(invalid("max_commands", "must allow at least one queued command".to_string()));
        }
        match &self.partition {
            PartitionConfig::Grid(g) => {
                positive_extent("partition.node_size", g.node_size)?;
                positive_count("partition.cell_nodes", g.cell_nodes)?;
                finite_origin("partition.world_origin", g.world_origin)
            }
            PartitionConfig::Zone(z) => {
                positive_extent("partition.cell_size", z.cell_size)?;
                positive_count("partition.zone_cells", z.zone_cells)?;
                finite_origin("partition.world_origin", z.world_origin)
            }
        }
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn positive_extent(field: &'static str, v: DVec2) -> Result<(), ConfigError> {
    if v.is_finite() && v.x > 0.0 && v.y > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{v} must be finite and positive")))
    }
}

fn positive_count(field: &'static str, v: IVec2) -> Result<(), ConfigError> {
    if v.x > 0 && v.y > 0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{v} must be positive")))
    }
}

fn finite_origin(field: &'static str, v: DVec2) -> Result<(), ConfigError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("{v} must be finite")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = WorldConfig::default();
        assert_eq!(cfg.max_commands, 16);
        assert_eq!(cfg.damp_value, 4.0);
        assert_eq!(cfg.damp_threshold, 0.8);
        assert!(cfg.validate().is_ok());
        match cfg.partition {
            PartitionConfig::Grid(g) => assert_eq!(g.cell_extent(), DVec2::splat(512.0)),
            PartitionConfig::Zone(_) => panic!("default partition should be the grid"),
        }
    }

    #[test]
    fn test_parse_zone_config() {
        let src = r#"
            damp_value = 2.5
            max_commands = 4

            [partition]
            kind = "zone"
            cell_size = [16.0, 16.0]
            zone_cells = [8, 8]
        "#;
        let cfg = WorldConfig::from_toml_str(src).unwrap();
        assert_eq!(cfg.damp_value, 2.5);
        assert_eq!(cfg.damp_threshold, 0.8);
        assert_eq!(cfg.max_commands, 4);
        match cfg.partition {
            PartitionConfig::Zone(z) => {
                assert_eq!(z.cell_size, DVec2::splat(16.0));
                assert_eq!(z.zone_cells, IVec2::splat(8));
                assert_eq!(z.world_origin, DVec2::ZERO);
            }
            PartitionConfig::Grid(_) => panic!("expected zone partition"),
        }
    }

    #[test]
    fn test_rejects_bad_extent() {
        let src = r#"
            [partition]
            kind = "grid"
            node_size = [0.0, 32.0]
        "#;
        let err = WorldConfig::from_toml_str(src).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "partition.node_size", .. }));
    }

    #[test]
    fn test_rejects_zero_command_bound() {
        let err = WorldConfig::from_toml_str("max_commands = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_commands", .. }));
        assert!(WorldConfig::from_toml_str("max_commands = 1").is_ok());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = WorldConfig::from_toml_str("damp_value = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
