use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::animation::DEFAULT_REVEAL_INTERVAL;
use crate::graph::curve::CurveProfile;
use crate::graph::layout::{AuthoredLayout, ClusterKey, ClusterLayout, GlobeLayout, LayoutProvider};
use crate::graph::style::{DecorationThresholds, StrokeMapping};
use crate::graph::types::{GeoCoord, Point};

/// Rendering knobs, loaded from TOML. Every field has a default, so an empty
/// file is the vivid preset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub connections: ConnectionConfig,
    #[serde(default)]
    pub curvature: CurveProfile,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_canvas_width")]
    pub width: f64,
    #[serde(default = "default_canvas_height")]
    pub height: f64,
    #[serde(default = "default_canvas_padding")]
    pub padding: f64,
}

fn default_canvas_width() -> f64 {
    800.0
}
fn default_canvas_height() -> f64 {
    600.0
}
fn default_canvas_padding() -> f64 {
    40.0
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_canvas_width(),
            height: default_canvas_height(),
            padding: default_canvas_padding(),
        }
    }
}

impl CanvasConfig {
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// `[connections]`: stroke mapping and decoration thresholds side by side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(flatten)]
    pub stroke: StrokeMapping,
    #[serde(flatten)]
    pub decorations: DecorationThresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_reveal_interval_ms")]
    pub reveal_interval_ms: u64,
    /// Start the reveal over once every relationship is shown.
    #[serde(default = "default_reveal_loop")]
    pub reveal_loop: bool,
}

fn default_reveal_interval_ms() -> u64 {
    DEFAULT_REVEAL_INTERVAL.as_millis() as u64
}
fn default_reveal_loop() -> bool {
    true
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            reveal_interval_ms: default_reveal_interval_ms(),
            reveal_loop: default_reveal_loop(),
        }
    }
}

impl AnimationConfig {
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }
}

/// Which layout positions the entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStrategy {
    /// The dataset's own position table; entities without one are not drawn.
    #[default]
    Authored,
    Cluster,
    Globe,
}

impl FromStr for LayoutStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "authored" => Ok(LayoutStrategy::Authored),
            "cluster" => Ok(LayoutStrategy::Cluster),
            "globe" => Ok(LayoutStrategy::Globe),
            other => Err(format!(
                "unknown layout '{other}' (use authored, cluster or globe)"
            )),
        }
    }
}

impl fmt::Display for LayoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LayoutStrategy::Authored => "authored",
            LayoutStrategy::Cluster => "cluster",
            LayoutStrategy::Globe => "globe",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub strategy: LayoutStrategy,
    #[serde(default)]
    pub cluster_key: ClusterKey,
    #[serde(default = "default_cluster_columns")]
    pub cluster_columns: usize,
    #[serde(default = "default_cluster_spacing")]
    pub cluster_spacing_x: f64,
    #[serde(default = "default_cluster_spacing")]
    pub cluster_spacing_y: f64,
    #[serde(default = "default_globe_radius")]
    pub globe_radius: f64,
    #[serde(default = "default_globe_view_lat")]
    pub globe_view_lat: f64,
    #[serde(default = "default_globe_view_lng")]
    pub globe_view_lng: f64,
}

fn default_cluster_columns() -> usize {
    3
}
fn default_cluster_spacing() -> f64 {
    260.0
}
fn default_globe_radius() -> f64 {
    240.0
}
fn default_globe_view_lat() -> f64 {
    15.0
}
fn default_globe_view_lng() -> f64 {
    45.0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            strategy: LayoutStrategy::default(),
            cluster_key: ClusterKey::default(),
            cluster_columns: default_cluster_columns(),
            cluster_spacing_x: default_cluster_spacing(),
            cluster_spacing_y: default_cluster_spacing(),
            globe_radius: default_globe_radius(),
            globe_view_lat: default_globe_view_lat(),
            globe_view_lng: default_globe_view_lng(),
        }
    }
}

impl LayoutConfig {
    pub fn cluster(&self) -> ClusterLayout {
        ClusterLayout {
            key: self.cluster_key,
            columns: self.cluster_columns,
            spacing_x: self.cluster_spacing_x,
            spacing_y: self.cluster_spacing_y,
            ..ClusterLayout::default()
        }
    }

    /// Globe centered on the canvas.
    pub fn globe(&self, canvas: &CanvasConfig) -> GlobeLayout {
        GlobeLayout {
            center: canvas.center(),
            radius: self.globe_radius,
            view: GeoCoord {
                lat: self.globe_view_lat,
                lng: self.globe_view_lng,
            },
        }
    }
}

impl LayoutConfig {
    /// The layout for `strategy`. An authored strategy without a position
    /// table falls back to clustering.
    pub fn provider(
        &self,
        canvas: &CanvasConfig,
        authored: Option<&AuthoredLayout>,
    ) -> Box<dyn LayoutProvider> {
        match (self.strategy, authored) {
            (LayoutStrategy::Authored, Some(table)) => Box::new(table.clone()),
            (LayoutStrategy::Authored, None) => {
                log::warn!("dataset has no position table, using the cluster layout");
                Box::new(self.cluster())
            }
            (LayoutStrategy::Cluster, _) => Box::new(self.cluster()),
            (LayoutStrategy::Globe, _) => Box::new(self.globe(canvas)),
        }
    }
}

impl RenderConfig {
    pub fn vivid() -> Self {
        Self::default()
    }

    /// Thinner strokes, uniform curvature and a single particle.
    pub fn classic() -> Self {
        Self {
            connections: ConnectionConfig {
                stroke: StrokeMapping::classic(),
                decorations: DecorationThresholds::classic(),
            },
            curvature: CurveProfile::classic(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RenderConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    fn validate(&self) -> Result<()> {
        let c = &self.canvas;
        if !(c.width.is_finite() && c.width > 0.0 && c.height.is_finite() && c.height > 0.0) {
            return Err(Error::Config(format!(
                "canvas size must be positive, got {}x{}",
                c.width, c.height
            )));
        }
        if self.animation.reveal_interval_ms == 0 {
            return Err(Error::Config(
                "animation.reveal_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
