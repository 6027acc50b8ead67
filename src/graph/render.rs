//! Scene building and SVG output.
//!
//! [`Scene::build`] resolves every visible entity and relationship against a
//! coordinate map. Anything without a position is left out: entities are
//! dropped silently, relationships are listed in [`Scene::skipped`]. The
//! [`GraphRenderer`] then writes the scene as a standalone SVG document.

use std::collections::BTreeSet;
use std::f64::consts::PI;

use super::curve::{QuadCurve, curve};
use super::layout::{BBox, CoordinateMap, LayoutProvider};
use super::registry::{EntityRegistry, RelationshipRegistry};
use super::style::{
    ConnectionStyle, NodeShape, NodeVariant, ORBIT_TRUST, SPARKLE_TRUST, TrustTier,
    category_color, house_half_size, trust_pips,
};
use super::types::{Category, Entity, EntityId, Point, Relationship, RelationshipId};
use super::view::{ViewState, filter_view};
use crate::config::RenderConfig;
use crate::fonts::TextMeasure;
use crate::theme::Theme;
use crate::xml::{DomIds, escape_xml, initial};

/// Radius of the clickable category marker on each connection.
pub const MARKER_RADIUS: f64 = 10.0;

const BADGE_RADIUS: f64 = 24.0;
const TIER_RADIUS: f64 = 26.0;
const GLOW_OPACITY: f64 = 0.3;
const PARTICLE_RADIUS: f64 = 3.0;
const DOT_RADIUS: f64 = 2.0;
const PIP_RADIUS: f64 = 2.5;
const PIP_SPACING: f64 = 7.0;
const PLATE_GAP: f64 = 12.0;
/// Name plate and city line below a node, past its radius.
const LABEL_EXTENT: f64 = PLATE_GAP + 40.0;
const LEGEND_ROW: f64 = 18.0;
const LEGEND_SWATCH: f64 = 24.0;

/// Per-node interaction state, decided by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    pub selected: bool,
    pub hovered: bool,
    /// Selected, hovered, or related to the selection.
    pub highlighted: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub variant: NodeVariant,
    /// Draw clickable midpoint markers on connections.
    pub interactive: bool,
    /// Draw the category and verification key in the top-left corner.
    pub legend: bool,
}

#[derive(Debug, Clone)]
pub struct NodeGlyph<'a> {
    pub entity: &'a Entity,
    pub center: Point,
    pub tier: TrustTier,
    /// Hit radius, also used to place the name plate.
    pub radius: f64,
    pub state: NodeState,
}

#[derive(Debug, Clone)]
pub struct ConnectionGlyph<'a> {
    pub relationship: &'a Relationship,
    /// Document-unique `id` of the drawn path.
    pub path_id: String,
    pub curve: QuadCurve,
    pub style: ConnectionStyle,
    /// Straight midpoint of the endpoints.
    pub marker: Point,
    /// Touches the selected entity.
    pub emphasized: bool,
}

/// Everything one render pass draws, fully resolved.
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    pub nodes: Vec<NodeGlyph<'a>>,
    pub connections: Vec<ConnectionGlyph<'a>>,
    /// Relationships with at least one unplaced endpoint, in input order.
    pub skipped: Vec<RelationshipId>,
    /// Visible area: the configured canvas grown to hold every node with its
    /// labels and every curve, negative coordinates included.
    pub view_box: BBox,
    pub variant: NodeVariant,
    pub interactive: bool,
    pub legend: bool,
}

fn node_radius(variant: NodeVariant, entity: &Entity) -> f64 {
    match variant {
        NodeVariant::Badge => BADGE_RADIUS,
        NodeVariant::Tiered => TIER_RADIUS,
        NodeVariant::House => house_half_size(entity.member_count) + 4.0,
    }
}

impl<'a> Scene<'a> {
    /// Resolve entities and relationships against `coords`. Connections keep
    /// the order of `relationships`; nodes keep the order of `entities` and
    /// are drawn above every connection.
    pub fn build(
        entities: &[&'a Entity],
        relationships: &[&'a Relationship],
        coords: &CoordinateMap,
        view: &ViewState,
        config: &RenderConfig,
        options: RenderOptions,
    ) -> Self {
        let highlighted = view.highlighted(relationships.iter().copied());

        let mut nodes = Vec::with_capacity(entities.len());
        for &entity in entities {
            let Some(center) = coords.get(&entity.id) else {
                log::debug!("entity {} has no position, not drawn", entity.id);
                continue;
            };
            nodes.push(NodeGlyph {
                entity,
                center,
                tier: TrustTier::from_score(entity.trust_score),
                radius: node_radius(options.variant, entity),
                state: NodeState {
                    selected: view.is_selected(&entity.id),
                    hovered: view.is_hovered(&entity.id),
                    highlighted: highlighted.contains(&entity.id),
                },
            });
        }

        let mapping = &config.connections.stroke;
        let thresholds = &config.connections.decorations;
        let mut connections = Vec::with_capacity(relationships.len());
        let mut skipped = Vec::new();
        let mut ids = DomIds::new();
        for &rel in relationships {
            let (Some(from), Some(to)) = (coords.get(&rel.from), coords.get(&rel.to)) else {
                log::debug!(
                    "relationship {} skipped: {} -> {} not fully placed",
                    rel.id,
                    rel.from,
                    rel.to
                );
                skipped.push(rel.id.clone());
                continue;
            };
            connections.push(ConnectionGlyph {
                relationship: rel,
                path_id: ids.claim("kg-path", rel.id.as_str()),
                curve: curve(from, to, rel.category, &config.curvature),
                style: ConnectionStyle::for_relationship(rel, mapping, thresholds),
                marker: from.midpoint(to),
                emphasized: view.selected.as_ref().is_some_and(|s| rel.touches(s)),
            });
        }

        let canvas = BBox::new(0.0, 0.0, config.canvas.width, config.canvas.height);
        let content = BBox::enclosing(
            nodes
                .iter()
                .map(|n| n.center)
                .chain(connections.iter().map(|c| c.curve.point_at(0.5))),
        );
        let view_box = match content {
            Some(content) => {
                let extent = nodes.iter().map(|n| n.radius).fold(0.0, f64::max) + LABEL_EXTENT;
                canvas.union(&content.with_padding(config.canvas.padding + extent))
            }
            None => canvas,
        };
        if view_box != canvas {
            log::debug!(
                "canvas grown to {:.0}x{:.0} at ({:.0}, {:.0}) to fit the layout",
                view_box.width,
                view_box.height,
                view_box.x,
                view_box.y
            );
        }

        Scene {
            nodes,
            connections,
            skipped,
            view_box,
            variant: options.variant,
            interactive: options.interactive,
            legend: options.legend,
        }
    }

    pub fn node(&self, id: &EntityId) -> Option<&NodeGlyph<'a>> {
        self.nodes.iter().find(|n| &n.entity.id == id)
    }
}

/// Output of a full render pass.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub svg: String,
    pub view_box: BBox,
    pub skipped: Vec<RelationshipId>,
}

/// Renders family networks to SVG with one theme and configuration.
pub struct GraphRenderer<M: TextMeasure> {
    theme: Theme,
    config: RenderConfig,
    options: RenderOptions,
    measure: M,
}

impl<M: TextMeasure> GraphRenderer<M> {
    pub fn new(theme: Theme, config: RenderConfig, measure: M) -> Self {
        Self {
            theme,
            config,
            options: RenderOptions::default(),
            measure,
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Lay out, filter and draw. `visible` caps how many of the filtered
    /// relationships are drawn, for a reveal in progress.
    pub fn render(
        &mut self,
        entities: &EntityRegistry,
        relationships: &RelationshipRegistry,
        layout: &dyn LayoutProvider,
        view: &ViewState,
        visible: Option<usize>,
    ) -> Rendered {
        let coords = layout.layout(entities);
        let shown = filter_view(entities, relationships, view);
        let count = visible
            .unwrap_or(shown.relationships.len())
            .min(shown.relationships.len());
        let scene = Scene::build(
            &shown.entities,
            &shown.relationships[..count],
            &coords,
            view,
            &self.config,
            self.options,
        );
        if !scene.skipped.is_empty() {
            log::info!("{} relationship(s) not drawn", scene.skipped.len());
        }

        Rendered {
            svg: self.render_scene(&scene),
            view_box: scene.view_box,
            skipped: scene.skipped,
        }
    }

    pub fn render_scene(&mut self, scene: &Scene<'_>) -> String {
        let theme = &self.theme;
        let view = scene.view_box;
        let mut svg = String::new();
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="{:.2} {:.2} {:.2} {:.2}" font-family="{}">"#,
            view.width.ceil(),
            view.height.ceil(),
            view.x,
            view.y,
            view.width,
            view.height,
            escape_xml(&theme.font_family)
        ));
        write_defs(&mut svg, scene, theme);
        svg.push_str(&format!(
            r#"<rect class="background" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" />"#,
            view.x, view.y, view.width, view.height, theme.background_color
        ));

        svg.push_str(r#"<g class="connections">"#);
        for glyph in &scene.connections {
            write_connection(&mut svg, glyph, scene.interactive, theme);
        }
        svg.push_str("</g>");

        svg.push_str(r#"<g class="nodes">"#);
        for glyph in &scene.nodes {
            write_node(&mut svg, glyph, scene.variant, theme, &mut self.measure);
        }
        svg.push_str("</g>");

        if scene.legend {
            let origin = Point::new(view.x + 16.0, view.y + 16.0);
            let dash = &self.config.connections.stroke.dash;
            write_legend(&mut svg, origin, dash, theme, &mut self.measure);
        }

        svg.push_str("</svg>");
        svg
    }
}

fn gradient_id(tier: TrustTier, part: &str) -> String {
    format!("kg-{}-{}", tier.as_str(), part)
}

fn write_defs(svg: &mut String, scene: &Scene<'_>, theme: &Theme) {
    svg.push_str("<defs>");
    svg.push_str(
        r#"<filter id="kg-glow" x="-50%" y="-50%" width="200%" height="200%"><feGaussianBlur stdDeviation="3" /></filter>"#,
    );
    svg.push_str(&format!(
        r#"<filter id="kg-shadow" x="-20%" y="-20%" width="140%" height="140%"><feDropShadow dx="0" dy="2" stdDeviation="3" flood-color="{}" flood-opacity="0.6" /></filter>"#,
        theme.selection_color
    ));

    let tiers: BTreeSet<TrustTier> = scene.nodes.iter().map(|n| n.tier).collect();
    for tier in tiers {
        let style = tier.style();
        svg.push_str(&format!(
            r#"<linearGradient id="{}" x1="0%" y1="0%" x2="100%" y2="100%">"#,
            gradient_id(tier, "outer")
        ));
        for (stop, color) in ["0%", "50%", "100%"].iter().zip(style.primary) {
            svg.push_str(&format!(r#"<stop offset="{stop}" stop-color="{color}" />"#));
        }
        svg.push_str("</linearGradient>");

        svg.push_str(&format!(
            r#"<radialGradient id="{}">"#,
            gradient_id(tier, "core")
        ));
        for (stop, color) in ["0%", "100%"].iter().zip(style.secondary) {
            svg.push_str(&format!(r#"<stop offset="{stop}" stop-color="{color}" />"#));
        }
        svg.push_str("</radialGradient>");
    }
    svg.push_str("</defs>");
}

fn write_connection(
    svg: &mut String,
    glyph: &ConnectionGlyph<'_>,
    interactive: bool,
    theme: &Theme,
) {
    let rel = glyph.relationship;
    let style = &glyph.style;
    let d = glyph.curve.svg_path();

    svg.push_str(&format!(
        r#"<g class="connection {}" data-id="{}" data-from="{}" data-to="{}">"#,
        rel.category,
        escape_xml(rel.id.as_str()),
        escape_xml(rel.from.as_str()),
        escape_xml(rel.to.as_str())
    ));

    let decorate = !glyph.curve.is_degenerate();
    if decorate && style.glow {
        svg.push_str(&format!(
            r#"<path class="glow" d="{}" fill="none" stroke="{}" stroke-width="{:.2}" stroke-opacity="{:.2}" filter="url(#kg-glow)" />"#,
            d,
            style.color,
            style.width * 2.0,
            GLOW_OPACITY
        ));
    }

    let dash = style
        .dash
        .as_deref()
        .map(|d| format!(r#" stroke-dasharray="{}""#, escape_xml(d)))
        .unwrap_or_default();
    let shadow = if glyph.emphasized {
        r#" filter="url(#kg-shadow)""#
    } else {
        ""
    };
    svg.push_str(&format!(
        r#"<path id="{}" class="link" d="{}" fill="none" stroke="{}" stroke-width="{:.2}" stroke-opacity="{:.2}" stroke-linecap="round"{}{} />"#,
        glyph.path_id,
        d,
        style.color,
        style.width,
        style.opacity,
        dash,
        shadow
    ));

    if decorate {
        for p in glyph.curve.sample(style.dots) {
            svg.push_str(&format!(
                r#"<circle class="dot" cx="{:.2}" cy="{:.2}" r="{:.1}" fill="{}" fill-opacity="{:.2}" />"#,
                p.x, p.y, DOT_RADIUS, style.color, style.opacity
            ));
        }
        for i in 0..style.particles {
            svg.push_str(&format!(
                r#"<circle class="particle" r="{:.1}" fill="{}"><animateMotion dur="{:.2}s" begin="{:.2}s" repeatCount="indefinite" path="{}" /></circle>"#,
                PARTICLE_RADIUS,
                style.color,
                style.particle_period_secs,
                i as f64 * style.particle_stagger_secs,
                d
            ));
        }
    }

    if interactive {
        let label = if rel.subtype.is_empty() {
            rel.category.to_string()
        } else {
            rel.subtype.replace('_', " ")
        };
        svg.push_str(&format!(
            r#"<g class="marker" data-relationship="{}"><title>{}</title><circle cx="{:.2}" cy="{:.2}" r="{:.1}" fill="{}" stroke="{}" stroke-width="2" /><text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="central" font-size="{:.1}" font-weight="bold" fill="{}">{}</text></g>"#,
            escape_xml(rel.id.as_str()),
            escape_xml(&label),
            glyph.marker.x,
            glyph.marker.y,
            MARKER_RADIUS,
            theme.card_color,
            style.color,
            glyph.marker.x,
            glyph.marker.y,
            theme.font_size_small,
            style.color,
            rel.category.initial()
        ));
    }

    svg.push_str("</g>");
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Regular polygon / star outline, first vertex straight up.
fn shape_points(shape: NodeShape, c: Point, r: f64) -> Vec<Point> {
    let ring = |n: usize, radius: &dyn Fn(usize) -> f64| -> Vec<Point> {
        (0..n)
            .map(|i| {
                let angle = -PI / 2.0 + i as f64 * 2.0 * PI / n as f64;
                let r = radius(i);
                Point::new(c.x + r * angle.cos(), c.y + r * angle.sin())
            })
            .collect()
    };
    match shape {
        NodeShape::Hexagon => ring(6, &|_| r),
        NodeShape::Diamond => ring(4, &|_| r),
        NodeShape::Star => ring(10, &|i| if i % 2 == 0 { r } else { r * 0.5 }),
        NodeShape::Circle => Vec::new(),
    }
}

fn write_node<M: TextMeasure>(
    svg: &mut String,
    glyph: &NodeGlyph<'_>,
    variant: NodeVariant,
    theme: &Theme,
    measure: &mut M,
) {
    let entity = glyph.entity;
    let c = glyph.center;
    let r = glyph.radius;

    svg.push_str(&format!(
        r#"<g class="node {}" data-id="{}"><title>{} · {} · trust {}</title>"#,
        glyph.tier.as_str(),
        escape_xml(entity.id.as_str()),
        escape_xml(&entity.name),
        escape_xml(&entity.location.city),
        trust_label(entity.trust_score)
    ));

    if glyph.state.selected {
        svg.push_str(&format!(
            r#"<circle class="selection" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{}" stroke-width="3" />"#,
            c.x,
            c.y,
            r + 6.0,
            theme.selection_color
        ));
    } else if glyph.state.highlighted || glyph.state.hovered {
        svg.push_str(&format!(
            r#"<circle class="highlight" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{}" stroke-opacity="0.4" stroke-width="2" />"#,
            c.x,
            c.y,
            r + 4.0,
            theme.selection_color
        ));
    }

    match variant {
        NodeVariant::Badge => write_badge(svg, glyph, theme),
        NodeVariant::Tiered => write_tiered(svg, glyph),
        NodeVariant::House => write_house(svg, glyph, theme),
    }

    if entity.verified {
        let bx = c.x + r * 0.7;
        let by = c.y - r * 0.7;
        svg.push_str(&format!(
            r#"<g class="verified"><circle cx="{:.2}" cy="{:.2}" r="7" fill="{}" stroke="{}" stroke-width="1.5" /><path d="M {:.2} {:.2} L {:.2} {:.2} L {:.2} {:.2}" fill="none" stroke="{}" stroke-width="1.5" /></g>"#,
            bx,
            by,
            theme.badge_color,
            theme.card_color,
            bx - 3.0,
            by,
            bx - 1.0,
            by + 2.0,
            bx + 3.0,
            by - 2.0,
            theme.card_color
        ));
    }

    write_name_plate(svg, glyph, theme, measure);
    svg.push_str("</g>");
}

fn trust_label(score: f64) -> String {
    if score.is_finite() {
        format!("{:.1}", score)
    } else {
        "n/a".to_string()
    }
}

fn write_badge(svg: &mut String, glyph: &NodeGlyph<'_>, theme: &Theme) {
    let c = glyph.center;
    let r = glyph.radius;
    let style = glyph.tier.style();
    let stroke_width = if glyph.state.hovered { 4.0 } else { 3.0 };

    svg.push_str(&format!(
        r#"<circle class="body" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" stroke="{}" stroke-width="{:.1}" />"#,
        c.x, c.y, r, style.secondary[0], theme.card_color, stroke_width
    ));
    svg.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="central" font-size="16" font-weight="bold" fill="white">{}</text>"#,
        c.x,
        c.y,
        initial(&glyph.entity.name)
    ));

    let mx = c.x + r * 0.7;
    let my = c.y + r * 0.7;
    svg.push_str(&format!(
        r#"<g class="members"><circle cx="{:.2}" cy="{:.2}" r="9" fill="{}" stroke="{}" stroke-width="1.5" /><text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="central" font-size="{:.1}" fill="{}">{}</text></g>"#,
        mx,
        my,
        theme.card_color,
        style.accent,
        mx,
        my,
        theme.font_size_small,
        theme.text_color,
        glyph.entity.member_count
    ));
}

fn write_tiered(svg: &mut String, glyph: &NodeGlyph<'_>) {
    let c = glyph.center;
    let r = glyph.radius;
    let tier = glyph.tier;
    let style = tier.style();
    let trust = glyph.entity.trust_score;

    if trust >= ORBIT_TRUST {
        for (offset, opacity) in [(8.0, 0.5), (14.0, 0.3)] {
            svg.push_str(&format!(
                r#"<circle class="orbit" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{}" stroke-opacity="{:.1}" stroke-dasharray="2,4" />"#,
                c.x,
                c.y,
                r + offset,
                style.accent,
                opacity
            ));
        }
    }

    let stroke_width = if glyph.state.hovered { 3.0 } else { 2.0 };
    let fill = format!("url(#{})", gradient_id(tier, "outer"));
    match style.shape {
        NodeShape::Circle => svg.push_str(&format!(
            r#"<circle class="body" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" stroke="white" stroke-width="{:.1}" />"#,
            c.x,
            c.y,
            r * 0.9,
            fill,
            stroke_width
        )),
        shape => svg.push_str(&format!(
            r#"<polygon class="body" points="{}" fill="{}" stroke="white" stroke-width="{:.1}" stroke-linejoin="round" />"#,
            points_attr(&shape_points(shape, c, r)),
            fill,
            stroke_width
        )),
    }

    svg.push_str(&format!(
        r#"<circle class="core" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="url(#{})" />"#,
        c.x,
        c.y,
        r * 0.45,
        gradient_id(tier, "core")
    ));
    svg.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="central" font-size="12" font-weight="bold" fill="white">{}</text>"#,
        c.x,
        c.y,
        initial(&glyph.entity.name)
    ));

    if trust >= SPARKLE_TRUST {
        for k in 0..4 {
            let angle = -PI / 4.0 + k as f64 * PI / 2.0;
            let at = Point::new(c.x + (r + 4.0) * angle.cos(), c.y + (r + 4.0) * angle.sin());
            let star: Vec<Point> = (0..8)
                .map(|i| {
                    let a = -PI / 2.0 + i as f64 * PI / 4.0;
                    let len = if i % 2 == 0 { 4.0 } else { 1.5 };
                    Point::new(at.x + len * a.cos(), at.y + len * a.sin())
                })
                .collect();
            svg.push_str(&format!(
                r##"<polygon class="sparkle" points="{}" fill="#fde68a" />"##,
                points_attr(&star)
            ));
        }
    }

    let pips = trust_pips(trust);
    let start = c.x - (pips.saturating_sub(1)) as f64 * PIP_SPACING / 2.0;
    for i in 0..pips {
        svg.push_str(&format!(
            r#"<circle class="pip" cx="{:.2}" cy="{:.2}" r="{:.1}" fill="{}" />"#,
            start + i as f64 * PIP_SPACING,
            c.y + r + 5.0,
            PIP_RADIUS,
            style.accent
        ));
    }
}

fn write_house(svg: &mut String, glyph: &NodeGlyph<'_>, theme: &Theme) {
    let c = glyph.center;
    let h = house_half_size(glyph.entity.member_count);
    let tier = glyph.tier;
    let style = tier.style();
    let eave = c.y - h * 0.2;

    svg.push_str(&format!(
        r#"<rect class="body" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="{}" stroke-width="2" />"#,
        c.x - h,
        eave,
        h * 2.0,
        h * 1.2,
        theme.card_color,
        style.accent
    ));
    let roof = [
        Point::new(c.x - h - 4.0, eave),
        Point::new(c.x, c.y - h),
        Point::new(c.x + h + 4.0, eave),
    ];
    svg.push_str(&format!(
        r#"<polygon class="roof" points="{}" fill="url(#{})" stroke="{}" stroke-width="2" stroke-linejoin="round" />"#,
        points_attr(&roof),
        gradient_id(tier, "outer"),
        style.accent
    ));
    svg.push_str(&format!(
        r#"<rect class="door" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" />"#,
        c.x - h * 0.2,
        c.y + h * 0.4,
        h * 0.4,
        h * 0.6,
        style.accent
    ));
    svg.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="central" font-size="{:.1}" fill="{}">{}</text>"#,
        c.x,
        c.y + h * 0.1,
        theme.font_size_small,
        theme.text_color,
        glyph.entity.member_count
    ));
}

fn write_name_plate<M: TextMeasure>(
    svg: &mut String,
    glyph: &NodeGlyph<'_>,
    theme: &Theme,
    measure: &mut M,
) {
    let entity = glyph.entity;
    let (w, h) = measure.measure_text(&entity.name, theme.font_size_label, true);
    let (w, h) = (w as f64 + 12.0, h as f64 + 6.0);
    let x = glyph.center.x - w / 2.0;
    let y = glyph.center.y + glyph.radius + PLATE_GAP;

    svg.push_str(&format!(
        r#"<rect class="plate" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="4" fill="{}" fill-opacity="0.9" stroke="{}" stroke-opacity="0.3" />"#,
        x, y, w, h, theme.card_color, theme.muted_text_color
    ));
    svg.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="central" font-size="{:.1}" font-weight="bold" fill="{}">{}</text>"#,
        glyph.center.x,
        y + h / 2.0,
        theme.font_size_label,
        theme.text_color,
        escape_xml(&entity.name)
    ));
    if !entity.location.city.is_empty() {
        svg.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="{:.1}" fill="{}">{}</text>"#,
            glyph.center.x,
            y + h + theme.font_size_small as f64 + 2.0,
            theme.font_size_small,
            theme.muted_text_color,
            escape_xml(&entity.location.city)
        ));
    }
}

const LEGEND_CATEGORIES: [(Category, &str); 4] = [
    (Category::Blood, "Blood"),
    (Category::Marriage, "Marriage"),
    (Category::Friendship, "Friendship"),
    (Category::Community, "Community"),
];

/// Key for the category colors and the dash: one swatch per category, then a
/// solid and a dashed sample line.
fn write_legend<M: TextMeasure>(
    svg: &mut String,
    origin: Point,
    dash: &str,
    theme: &Theme,
    measure: &mut M,
) {
    let rows: Vec<(&str, &str, Option<&str>)> = LEGEND_CATEGORIES
        .iter()
        .map(|&(category, label)| (label, category_color(category), None))
        .chain([
            ("Verified", theme.muted_text_color.as_str(), None),
            ("Unverified", theme.muted_text_color.as_str(), Some(dash)),
        ])
        .collect();

    let label_width = rows
        .iter()
        .map(|(label, _, _)| measure.measure_text(label, theme.font_size_small, false).0 as f64)
        .fold(0.0, f64::max);
    let width = 12.0 + LEGEND_SWATCH + 8.0 + label_width + 12.0;
    let height = 10.0 + rows.len() as f64 * LEGEND_ROW + 6.0;

    svg.push_str(r#"<g class="legend">"#);
    svg.push_str(&format!(
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="6" fill="{}" fill-opacity="0.9" stroke="{}" stroke-opacity="0.3" />"#,
        origin.x, origin.y, width, height, theme.card_color, theme.muted_text_color
    ));
    for (i, &(label, color, dash)) in rows.iter().enumerate() {
        let y = origin.y + 10.0 + (i as f64 + 0.5) * LEGEND_ROW;
        let x = origin.x + 12.0;
        let dash = dash
            .map(|d| format!(r#" stroke-dasharray="{}""#, escape_xml(d)))
            .unwrap_or_default();
        svg.push_str(&format!(
            r#"<line class="swatch" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="3" stroke-linecap="round"{} />"#,
            x,
            y,
            x + LEGEND_SWATCH,
            y,
            color,
            dash
        ));
        svg.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" dominant-baseline="central" font-size="{:.1}" fill="{}">{}</text>"#,
            x + LEGEND_SWATCH + 8.0,
            y,
            theme.font_size_small,
            theme.text_color,
            label
        ));
    }
    svg.push_str("</g>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::ApproxMeasure;
    use crate::graph::sample;
    use crate::graph::types::{Category, GeoCoord, Location};

    fn entity(id: &str, trust: f64) -> Entity {
        Entity {
            id: EntityId::new(id),
            name: id.to_uppercase(),
            surname: String::new(),
            location: Location {
                city: "Pune".to_string(),
                region: String::new(),
                country: String::new(),
                coordinates: GeoCoord::default(),
            },
            trust_score: trust,
            verified: false,
            member_count: 3,
            cluster: None,
        }
    }

    fn rel(id: &str, from: &str, to: &str, strength: f64) -> Relationship {
        Relationship {
            id: RelationshipId::new(id),
            from: EntityId::new(from),
            to: EntityId::new(to),
            category: Category::Friendship,
            subtype: "neighbours".to_string(),
            strength,
            verified: true,
            established: String::new(),
        }
    }

    fn coords(points: &[(&str, f64, f64)]) -> CoordinateMap {
        points
            .iter()
            .map(|&(id, x, y)| (EntityId::new(id), Point::new(x, y)))
            .collect()
    }

    #[test]
    fn unplaced_endpoint_skips_only_that_relationship() {
        let a = entity("a", 8.0);
        let b = entity("b", 8.0);
        let r1 = rel("r1", "a", "b", 0.5);
        let r2 = rel("r2", "a", "ghost", 0.5);
        let map = coords(&[("a", 0.0, 0.0), ("b", 100.0, 0.0)]);

        let scene = Scene::build(
            &[&a, &b],
            &[&r1, &r2],
            &map,
            &ViewState::new(),
            &RenderConfig::default(),
            RenderOptions::default(),
        );
        assert_eq!(scene.connections.len(), 1);
        assert_eq!(scene.connections[0].relationship.id.as_str(), "r1");
        assert_eq!(scene.skipped, vec![RelationshipId::new("r2")]);
    }

    #[test]
    fn unplaced_entity_is_not_drawn() {
        let a = entity("a", 8.0);
        let b = entity("b", 8.0);
        let map = coords(&[("a", 10.0, 10.0)]);
        let scene = Scene::build(
            &[&a, &b],
            &[],
            &map,
            &ViewState::new(),
            &RenderConfig::default(),
            RenderOptions::default(),
        );
        assert_eq!(scene.nodes.len(), 1);
        assert!(scene.node(&EntityId::new("b")).is_none());
    }

    #[test]
    fn selection_emphasizes_touching_connections() {
        let a = entity("a", 8.0);
        let b = entity("b", 8.0);
        let c = entity("c", 8.0);
        let ab = rel("ab", "a", "b", 0.5);
        let bc = rel("bc", "b", "c", 0.5);
        let map = coords(&[("a", 0.0, 0.0), ("b", 100.0, 0.0), ("c", 200.0, 0.0)]);
        let mut view = ViewState::new();
        view.select(&EntityId::new("a"));

        let scene = Scene::build(
            &[&a, &b, &c],
            &[&ab, &bc],
            &map,
            &view,
            &RenderConfig::default(),
            RenderOptions::default(),
        );
        assert!(scene.connections[0].emphasized);
        assert!(!scene.connections[1].emphasized);
        let node_b = scene.node(&EntityId::new("b")).expect("b drawn");
        assert!(node_b.state.highlighted);
        assert!(!node_b.state.selected);
        assert!(!scene.node(&EntityId::new("c")).expect("c drawn").state.highlighted);

        let mut renderer =
            GraphRenderer::new(Theme::default(), RenderConfig::default(), ApproxMeasure);
        let svg = renderer.render_scene(&scene);
        assert_eq!(svg.matches("url(#kg-shadow)").count(), 1);
    }

    #[test]
    fn coincident_endpoints_render_without_nan() {
        let a = entity("a", 9.5);
        let b = entity("b", 9.5);
        let ab = rel("ab", "a", "b", 0.95);
        let map = coords(&[("a", 50.0, 50.0), ("b", 50.0, 50.0)]);
        let scene = Scene::build(
            &[&a, &b],
            &[&ab],
            &map,
            &ViewState::new(),
            &RenderConfig::default(),
            RenderOptions::default(),
        );
        let mut renderer =
            GraphRenderer::new(Theme::default(), RenderConfig::default(), ApproxMeasure);
        let svg = renderer.render_scene(&scene);
        assert!(!svg.contains("NaN"));
        assert!(!svg.contains("inf"));
        assert!(!svg.contains("animateMotion"));
    }

    #[test]
    fn markers_are_drawn_only_when_interactive() {
        let fams = EntityRegistry::new(sample::families()).expect("families");
        let rels = RelationshipRegistry::new(sample::connections()).expect("connections");
        let layout = sample::authored_layout();

        let mut renderer =
            GraphRenderer::new(Theme::default(), RenderConfig::default(), ApproxMeasure);
        let out = renderer.render(&fams, &rels, &layout, &ViewState::new(), None);
        assert!(!out.svg.contains(r#"class="marker""#));
        assert!(out.skipped.is_empty());

        let mut renderer =
            GraphRenderer::new(Theme::default(), RenderConfig::default(), ApproxMeasure)
                .with_options(RenderOptions {
                    interactive: true,
                    ..RenderOptions::default()
                });
        let out = renderer.render(&fams, &rels, &layout, &ViewState::new(), None);
        assert_eq!(out.svg.matches(r#"class="marker""#).count(), 16);
    }

    #[test]
    fn reveal_cap_limits_drawn_connections() {
        let fams = EntityRegistry::new(sample::families()).expect("families");
        let rels = RelationshipRegistry::new(sample::connections()).expect("connections");
        let mut renderer =
            GraphRenderer::new(Theme::default(), RenderConfig::default(), ApproxMeasure);
        let out = renderer.render(
            &fams,
            &rels,
            &sample::authored_layout(),
            &ViewState::new(),
            Some(4),
        );
        assert_eq!(out.svg.matches(r#"class="link""#).count(), 4);
    }

    #[test]
    fn variants_draw_their_own_bodies() {
        let fams = EntityRegistry::new(sample::families()).expect("families");
        let rels = RelationshipRegistry::new(Vec::new()).expect("empty");
        let layout = sample::authored_layout();

        let draw = |variant| {
            GraphRenderer::new(Theme::default(), RenderConfig::default(), ApproxMeasure)
                .with_options(RenderOptions {
                    variant,
                    ..RenderOptions::default()
                })
                .render(&fams, &rels, &layout, &ViewState::new(), None)
                .svg
        };

        let tiered = draw(NodeVariant::Tiered);
        assert!(tiered.contains(r#"class="orbit""#));
        assert!(tiered.contains(r#"class="sparkle""#));
        assert!(tiered.contains(r#"class="pip""#));
        assert!(!draw(NodeVariant::House).contains(r#"class="orbit""#));
        assert!(draw(NodeVariant::House).contains(r#"class="roof""#));
        assert!(draw(NodeVariant::Badge).contains(r#"class="members""#));
    }

    #[test]
    fn only_verified_entities_get_a_badge() {
        let fams = EntityRegistry::new(sample::families()).expect("families");
        let rels = RelationshipRegistry::new(Vec::new()).expect("empty");
        let mut renderer =
            GraphRenderer::new(Theme::default(), RenderConfig::default(), ApproxMeasure);
        let out = renderer.render(
            &fams,
            &rels,
            &sample::authored_layout(),
            &ViewState::new(),
            None,
        );
        // fam_13 is the only unverified family.
        assert_eq!(out.svg.matches(r#"class="verified""#).count(), 14);
    }

    #[test]
    fn view_box_reaches_entities_at_negative_coordinates() {
        let a = entity("a", 8.0);
        let b = entity("b", 8.0);
        let ab = rel("ab", "a", "b", 0.5);
        let map = coords(&[("a", -150.0, -150.0), ("b", 300.0, 200.0)]);
        let scene = Scene::build(
            &[&a, &b],
            &[&ab],
            &map,
            &ViewState::new(),
            &RenderConfig::default(),
            RenderOptions::default(),
        );
        let view = scene.view_box;
        let extent = TIER_RADIUS + LABEL_EXTENT;
        assert!(view.x <= -150.0 - extent);
        assert!(view.y <= -150.0 - extent);
        assert!(view.right() >= 800.0);
        assert!(view.bottom() >= 600.0);
        assert!(scene.skipped.is_empty());

        let mut renderer =
            GraphRenderer::new(Theme::default(), RenderConfig::default(), ApproxMeasure);
        let svg = renderer.render_scene(&scene);
        assert!(svg.contains(&format!(
            r#"viewBox="{:.2} {:.2} {:.2} {:.2}""#,
            view.x, view.y, view.width, view.height
        )));
    }

    #[test]
    fn lowest_node_keeps_room_for_its_labels() {
        let a = entity("a", 8.0);
        let map = coords(&[("a", 400.0, 590.0)]);
        let scene = Scene::build(
            &[&a],
            &[],
            &map,
            &ViewState::new(),
            &RenderConfig::default(),
            RenderOptions::default(),
        );
        assert_eq!(scene.view_box.x, 0.0);
        assert!(scene.view_box.bottom() >= 590.0 + TIER_RADIUS + LABEL_EXTENT);
    }

    #[test]
    fn nan_trust_is_labelled_not_printed() {
        let a = entity("a", f64::NAN);
        let map = coords(&[("a", 100.0, 100.0)]);
        let scene = Scene::build(
            &[&a],
            &[],
            &map,
            &ViewState::new(),
            &RenderConfig::default(),
            RenderOptions::default(),
        );
        assert_eq!(scene.nodes[0].tier, TrustTier::Standard);
        let svg = GraphRenderer::new(Theme::default(), RenderConfig::default(), ApproxMeasure)
            .render_scene(&scene);
        assert!(svg.contains("trust n/a"));
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn sanitized_path_ids_stay_unique() {
        let a = entity("a", 8.0);
        let b = entity("b", 8.0);
        let r1 = rel("a<b", "a", "b", 0.5);
        let r2 = rel("a_b", "b", "a", 0.5);
        let map = coords(&[("a", 0.0, 0.0), ("b", 100.0, 0.0)]);
        let scene = Scene::build(
            &[&a, &b],
            &[&r1, &r2],
            &map,
            &ViewState::new(),
            &RenderConfig::default(),
            RenderOptions::default(),
        );
        let ids: Vec<&str> = scene.connections.iter().map(|c| c.path_id.as_str()).collect();
        assert_eq!(ids, vec!["kg-path-a_b", "kg-path-a_b-2"]);
    }
}
