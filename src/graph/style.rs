//! Pure mappings from data to visual treatment: relationship strength and
//! category to stroke, trust score to tier, tier to shape and palette.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::{Category, Relationship};

/// Base hue per category. Fixed; themes do not override it.
pub fn category_color(category: Category) -> &'static str {
    match category {
        Category::Blood => "#e11d48",
        Category::Marriage => "#f59e0b",
        Category::Friendship => "#3b82f6",
        Category::Community => "#10b981",
    }
}

/// Strength → stroke mapping. The floors keep weak relationships visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeMapping {
    #[serde(default = "default_width_multiplier")]
    pub width_multiplier: f64,
    #[serde(default = "default_min_width")]
    pub min_width: f64,
    #[serde(default = "default_min_opacity")]
    pub min_opacity: f64,
    /// `stroke-dasharray` for unverified relationships.
    #[serde(default = "default_dash")]
    pub dash: String,
}

fn default_width_multiplier() -> f64 {
    6.0
}
fn default_min_width() -> f64 {
    2.0
}
fn default_min_opacity() -> f64 {
    0.4
}
fn default_dash() -> String {
    "8,4".to_string()
}

/// Lowest floors any mapping may use.
pub const MIN_STROKE_WIDTH: f64 = 1.0;
pub const MIN_STROKE_OPACITY: f64 = 0.3;

impl Default for StrokeMapping {
    fn default() -> Self {
        Self::vivid()
    }
}

impl StrokeMapping {
    pub fn vivid() -> Self {
        Self {
            width_multiplier: default_width_multiplier(),
            min_width: default_min_width(),
            min_opacity: default_min_opacity(),
            dash: default_dash(),
        }
    }

    pub fn classic() -> Self {
        Self {
            width_multiplier: 4.0,
            min_width: MIN_STROKE_WIDTH,
            min_opacity: MIN_STROKE_OPACITY,
            dash: "5,5".to_string(),
        }
    }

    /// `max(floor, strength)`, never below 0.3 and never above 1.
    pub fn opacity(&self, strength: f64) -> f64 {
        let floor = self.min_opacity.max(MIN_STROKE_OPACITY);
        let strength = if strength.is_nan() { 0.0 } else { strength };
        strength.max(floor).min(1.0)
    }

    /// `max(floor, strength * k)`, never below 1.
    pub fn width(&self, strength: f64) -> f64 {
        let floor = self.min_width.max(MIN_STROKE_WIDTH);
        let scaled = strength * self.width_multiplier;
        if scaled.is_nan() { floor } else { scaled.max(floor) }
    }
}

/// Strength thresholds gating the additive decorations. Each decoration is
/// drawn when `strength` is strictly greater than its threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecorationThresholds {
    #[serde(default = "default_glow", rename = "glow_threshold")]
    pub glow: f64,
    #[serde(default = "default_particles", rename = "particle_threshold")]
    pub particles: f64,
    #[serde(default = "default_dots", rename = "dot_threshold")]
    pub dots: f64,
    #[serde(default = "default_particle_count")]
    pub particle_count: usize,
    #[serde(default = "default_particle_period")]
    pub particle_period_secs: f64,
    /// Delay between successive particles on one path.
    #[serde(default = "default_particle_stagger")]
    pub particle_stagger_secs: f64,
}

fn default_glow() -> f64 {
    0.8
}
fn default_particles() -> f64 {
    0.7
}
fn default_dots() -> f64 {
    0.6
}
fn default_particle_count() -> usize {
    3
}
fn default_particle_period() -> f64 {
    4.0
}
fn default_particle_stagger() -> f64 {
    1.3
}

impl Default for DecorationThresholds {
    fn default() -> Self {
        Self::vivid()
    }
}

impl DecorationThresholds {
    pub fn vivid() -> Self {
        Self {
            glow: default_glow(),
            particles: default_particles(),
            dots: default_dots(),
            particle_count: default_particle_count(),
            particle_period_secs: default_particle_period(),
            particle_stagger_secs: default_particle_stagger(),
        }
    }

    /// A single slow particle, no glow, no dots.
    pub fn classic() -> Self {
        Self {
            glow: f64::INFINITY,
            particles: 0.7,
            dots: f64::INFINITY,
            particle_count: 1,
            particle_period_secs: 3.0,
            particle_stagger_secs: 0.0,
        }
    }
}

/// Everything the connection renderer needs to know about one relationship,
/// independent of where it is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionStyle {
    pub color: &'static str,
    pub opacity: f64,
    pub width: f64,
    /// `None` draws a solid line.
    pub dash: Option<String>,
    pub glow: bool,
    pub particles: usize,
    pub particle_period_secs: f64,
    pub particle_stagger_secs: f64,
    /// Number of strength dots, `floor(strength * 5)` above the threshold.
    pub dots: usize,
}

impl ConnectionStyle {
    pub fn for_relationship(
        rel: &Relationship,
        mapping: &StrokeMapping,
        thresholds: &DecorationThresholds,
    ) -> Self {
        let strength = rel.strength;
        let dots = if strength > thresholds.dots {
            (strength.min(1.0) * 5.0).floor() as usize
        } else {
            0
        };

        Self {
            color: category_color(rel.category),
            opacity: mapping.opacity(strength),
            width: mapping.width(strength),
            dash: (!rel.verified).then(|| mapping.dash.clone()),
            glow: strength > thresholds.glow,
            particles: if strength > thresholds.particles {
                thresholds.particle_count
            } else {
                0
            },
            particle_period_secs: thresholds.particle_period_secs,
            particle_stagger_secs: thresholds.particle_stagger_secs,
            dots,
        }
    }
}

/// Visual bucket for a trust score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrustTier {
    Standard,
    Established,
    High,
    Exemplary,
}

impl TrustTier {
    /// `≥ 9`, `≥ 8`, `≥ 7`, else. NaN and negatives land in `Standard`.
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            TrustTier::Exemplary
        } else if score >= 8.0 {
            TrustTier::High
        } else if score >= 7.0 {
            TrustTier::Established
        } else {
            TrustTier::Standard
        }
    }

    pub fn style(self) -> &'static TierStyle {
        match self {
            TrustTier::Exemplary => &TIER_STYLES[0],
            TrustTier::High => &TIER_STYLES[1],
            TrustTier::Established => &TIER_STYLES[2],
            TrustTier::Standard => &TIER_STYLES[3],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrustTier::Exemplary => "exemplary",
            TrustTier::High => "high",
            TrustTier::Established => "established",
            TrustTier::Standard => "standard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Hexagon,
    Diamond,
    Star,
    Circle,
}

#[derive(Debug)]
pub struct TierStyle {
    pub shape: NodeShape,
    /// Outer gradient, three stops.
    pub primary: [&'static str; 3],
    /// Inner core gradient, two stops.
    pub secondary: [&'static str; 2],
    pub accent: &'static str,
}

static TIER_STYLES: [TierStyle; 4] = [
    TierStyle {
        shape: NodeShape::Hexagon,
        primary: ["#34d399", "#2dd4bf", "#22d3ee"],
        secondary: ["#10b981", "#0d9488"],
        accent: "#059669",
    },
    TierStyle {
        shape: NodeShape::Diamond,
        primary: ["#60a5fa", "#818cf8", "#c084fc"],
        secondary: ["#3b82f6", "#4f46e5"],
        accent: "#2563eb",
    },
    TierStyle {
        shape: NodeShape::Star,
        primary: ["#fbbf24", "#fb923c", "#facc15"],
        secondary: ["#f59e0b", "#ea580c"],
        accent: "#d97706",
    },
    TierStyle {
        shape: NodeShape::Circle,
        primary: ["#9ca3af", "#94a3b8", "#6b7280"],
        secondary: ["#6b7280", "#475569"],
        accent: "#4b5563",
    },
];

/// Orbit rings are drawn from this trust score up.
pub const ORBIT_TRUST: f64 = 8.5;
/// Sparkles are drawn from this trust score up.
pub const SPARKLE_TRUST: f64 = 9.0;
pub const MAX_TRUST_PIPS: usize = 4;

/// `min(4, floor(trust))`, zero for negative or NaN scores.
pub fn trust_pips(score: f64) -> usize {
    if score.is_nan() || score < 1.0 {
        return 0;
    }
    (score.floor() as usize).min(MAX_TRUST_PIPS)
}

/// How each entity is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeVariant {
    /// Round badge with the family initial and member count.
    Badge,
    /// Tier shape with orbit rings, sparkles and trust pips.
    #[default]
    Tiered,
    /// House pictograph sized by member count.
    House,
}

impl FromStr for NodeVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "badge" => Ok(NodeVariant::Badge),
            "tiered" => Ok(NodeVariant::Tiered),
            "house" => Ok(NodeVariant::House),
            other => Err(format!("unknown node variant '{other}' (use badge, tiered or house)")),
        }
    }
}

/// Half-width of a house pictograph: grows with member count, capped.
pub fn house_half_size(member_count: u32) -> f64 {
    (18.0 + 2.0 * member_count as f64).min(44.0)
}
