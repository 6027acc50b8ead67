use kingraph::config::RenderConfig;
use kingraph::dataset::Dataset;
use kingraph::fonts::ApproxMeasure;
use kingraph::graph::style::NodeVariant;
use kingraph::graph::{
    AuthoredLayout, Category, Entity, EntityId, EntityRegistry, GeoCoord, GraphRenderer,
    LayoutProvider, Location, Point, Relationship, RelationshipId, RelationshipRegistry,
    RenderOptions, Rendered, ViewState,
};
use kingraph::theme::Theme;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::reader::Reader as XmlReader;

#[derive(Debug, Clone)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
}

impl Element {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }
}

fn element(e: &BytesStart<'_>) -> Element {
    let attrs = e
        .attributes()
        .map(|a| {
            let a = a.expect("well-formed attribute");
            (
                String::from_utf8_lossy(a.key.as_ref()).to_string(),
                String::from_utf8_lossy(&a.value).to_string(),
            )
        })
        .collect();
    Element {
        name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
        attrs,
    }
}

/// Every start and empty element, in document order. Panics on malformed XML.
fn elements(svg: &str) -> Vec<Element> {
    let mut reader = XmlReader::from_str(svg);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut out = Vec::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(XmlEvent::Start(ref e)) => {
                depth += 1;
                out.push(element(e));
            }
            Ok(XmlEvent::Empty(ref e)) => out.push(element(e)),
            Ok(XmlEvent::End(_)) => depth -= 1,
            Ok(XmlEvent::Eof) => break,
            Err(e) => panic!("XML parse error at {}: {}", reader.buffer_position(), e),
            _ => {}
        }
        buf.clear();
    }
    assert_eq!(depth, 0, "unclosed elements");
    out
}

fn family(id: &str, name: &str) -> Entity {
    Entity {
        id: EntityId::new(id),
        name: name.to_string(),
        surname: String::new(),
        location: Location {
            city: "Pune".to_string(),
            region: String::new(),
            country: "India".to_string(),
            coordinates: GeoCoord {
                lat: 18.52,
                lng: 73.86,
            },
        },
        trust_score: 8.2,
        verified: true,
        member_count: 4,
        cluster: None,
    }
}

fn link(
    id: &str,
    from: &str,
    to: &str,
    category: Category,
    strength: f64,
    verified: bool,
) -> Relationship {
    Relationship {
        id: RelationshipId::new(id),
        from: EntityId::new(from),
        to: EntityId::new(to),
        category,
        subtype: String::new(),
        strength,
        verified,
        established: String::new(),
    }
}

fn render_full(
    entities: Vec<Entity>,
    relationships: Vec<Relationship>,
    positions: &[(&str, f64, f64)],
    config: RenderConfig,
    options: RenderOptions,
) -> Rendered {
    let entities = EntityRegistry::new(entities).expect("entities");
    let relationships = RelationshipRegistry::new(relationships).expect("relationships");
    let layout = AuthoredLayout::new(
        positions
            .iter()
            .map(|&(id, x, y)| (EntityId::new(id), Point::new(x, y))),
    );
    GraphRenderer::new(Theme::default(), config, ApproxMeasure)
        .with_options(options)
        .render(&entities, &relationships, &layout, &ViewState::new(), None)
}

fn render(
    entities: Vec<Entity>,
    relationships: Vec<Relationship>,
    positions: &[(&str, f64, f64)],
    config: RenderConfig,
) -> Rendered {
    render_full(entities, relationships, positions, config, RenderOptions::default())
}

fn render_with(
    entities: Vec<Entity>,
    relationships: Vec<Relationship>,
    positions: &[(&str, f64, f64)],
    options: RenderOptions,
) -> Rendered {
    render_full(entities, relationships, positions, RenderConfig::default(), options)
}

fn view_box(svg: &str) -> [f64; 4] {
    let root = elements(svg).into_iter().next().expect("root element");
    let values: Vec<f64> = root
        .attr("viewBox")
        .expect("viewBox")
        .split_whitespace()
        .map(|v| v.parse().expect("number"))
        .collect();
    [values[0], values[1], values[2], values[3]]
}

fn links(svg: &str) -> Vec<Element> {
    elements(svg)
        .into_iter()
        .filter(|e| e.name == "path" && e.has_class("link"))
        .collect()
}

#[test]
fn strong_friendship_is_a_solid_quadratic_arc() {
    let out = render(
        vec![family("a", "Alpha"), family("b", "Beta")],
        vec![link("ab", "a", "b", Category::Friendship, 0.9, true)],
        &[("a", 0.0, 0.0), ("b", 100.0, 0.0)],
        RenderConfig::vivid(),
    );
    let paths = links(&out.svg);
    assert_eq!(paths.len(), 1);
    let path = &paths[0];
    assert_eq!(path.attr("d"), Some("M 0.00 0.00 Q 50.00 25.00 100.00 0.00"));
    assert_eq!(path.attr("stroke"), Some("#3b82f6"));
    assert_eq!(path.attr("stroke-opacity"), Some("0.90"));
    assert_eq!(path.attr("stroke-width"), Some("5.40"));
    assert_eq!(path.attr("stroke-dasharray"), None);
}

#[test]
fn classic_preset_uses_thinner_strokes() {
    let out = render(
        vec![family("a", "Alpha"), family("b", "Beta")],
        vec![link("ab", "a", "b", Category::Friendship, 0.9, true)],
        &[("a", 0.0, 0.0), ("b", 100.0, 0.0)],
        RenderConfig::classic(),
    );
    let path = &links(&out.svg)[0];
    assert_eq!(path.attr("stroke-width"), Some("3.60"));
    // Uniform 0.3 curvature.
    assert_eq!(path.attr("d"), Some("M 0.00 0.00 Q 50.00 30.00 100.00 0.00"));
}

#[test]
fn relationship_with_unplaced_endpoint_is_skipped() {
    let out = render(
        vec![family("a", "Alpha"), family("b", "Beta"), family("c", "Gamma")],
        vec![
            link("ab", "a", "b", Category::Blood, 0.8, true),
            link("ac", "a", "c", Category::Blood, 0.8, true),
        ],
        &[("a", 0.0, 0.0), ("b", 100.0, 0.0)],
        RenderConfig::vivid(),
    );
    let paths = links(&out.svg);
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].attr("id"), Some("kg-path-ab"));
    assert_eq!(out.skipped, vec![RelationshipId::new("ac")]);

    let nodes = elements(&out.svg)
        .into_iter()
        .filter(|e| e.name == "g" && e.has_class("node"))
        .count();
    assert_eq!(nodes, 2);
}

#[test]
fn verification_changes_only_the_dash() {
    let out = render(
        vec![family("a", "Alpha"), family("b", "Beta")],
        vec![
            link("solid", "a", "b", Category::Community, 0.55, true),
            link("dashed", "a", "b", Category::Community, 0.55, false),
        ],
        &[("a", 0.0, 0.0), ("b", 120.0, 40.0)],
        RenderConfig::vivid(),
    );
    let paths = links(&out.svg);
    assert_eq!(paths.len(), 2);

    let strip = |e: &Element| -> Vec<(String, String)> {
        e.attrs
            .iter()
            .filter(|(k, _)| k != "id" && k != "stroke-dasharray")
            .cloned()
            .collect()
    };
    assert_eq!(strip(&paths[0]), strip(&paths[1]));
    assert_eq!(paths[0].attr("stroke-dasharray"), None);
    assert_eq!(paths[1].attr("stroke-dasharray"), Some("8,4"));
}

#[test]
fn decorations_follow_strength() {
    let strong = render(
        vec![family("a", "Alpha"), family("b", "Beta")],
        vec![link("ab", "a", "b", Category::Blood, 0.9, true)],
        &[("a", 0.0, 0.0), ("b", 200.0, 0.0)],
        RenderConfig::vivid(),
    );
    let els = elements(&strong.svg);
    let count = |class: &str| els.iter().filter(|e| e.has_class(class)).count();
    assert_eq!(count("glow"), 1);
    assert_eq!(count("particle"), 3);
    assert_eq!(count("dot"), 4);
    assert_eq!(els.iter().filter(|e| e.name == "animateMotion").count(), 3);

    let weak = render(
        vec![family("a", "Alpha"), family("b", "Beta")],
        vec![link("ab", "a", "b", Category::Blood, 0.5, true)],
        &[("a", 0.0, 0.0), ("b", 200.0, 0.0)],
        RenderConfig::vivid(),
    );
    let els = elements(&weak.svg);
    assert!(
        els.iter()
            .all(|e| !e.has_class("glow") && !e.has_class("particle") && !e.has_class("dot"))
    );
}

#[test]
fn hostile_names_stay_well_formed() {
    let out = render(
        vec![family("a&1", "Smith & <Sons> \"Ltd\""), family("b", "O'Brien\u{1}")],
        vec![link("a<b", "a&1", "b", Category::Marriage, 0.7, false)],
        &[("a&1", 10.0, 10.0), ("b", 300.0, 200.0)],
        RenderConfig::vivid(),
    );
    let els = elements(&out.svg);
    assert_eq!(els[0].name, "svg");
    assert_eq!(links(&out.svg)[0].attr("id"), Some("kg-path-a_b"));
}

#[test]
fn sample_network_renders_for_every_layout_and_variant() {
    let network = Dataset::sample().into_network().expect("sample");
    let config = RenderConfig::default();
    let authored = network.authored.clone().expect("sample positions");
    let layouts: Vec<Box<dyn LayoutProvider>> = vec![
        Box::new(authored),
        Box::new(config.layout.cluster()),
        Box::new(config.layout.globe(&config.canvas)),
    ];

    for layout in &layouts {
        for variant in [NodeVariant::Badge, NodeVariant::Tiered, NodeVariant::House] {
            let out = GraphRenderer::new(Theme::default(), config.clone(), ApproxMeasure)
                .with_options(RenderOptions {
                    variant,
                    interactive: true,
                    legend: true,
                })
                .render(
                    &network.entities,
                    &network.relationships,
                    layout.as_ref(),
                    &ViewState::new(),
                    None,
                );
            let els = elements(&out.svg);
            assert_eq!(els[0].name, "svg");
            assert!(!out.svg.contains("NaN"));
            let drawn = links(&out.svg).len();
            assert_eq!(drawn + out.skipped.len(), 16);
        }
    }
}

#[test]
fn built_in_themes_change_the_background() {
    let network = Dataset::sample().into_network().expect("sample");
    let layout = network.authored.clone().expect("positions");
    let mut backgrounds = Vec::new();
    for name in Theme::list_builtins() {
        let theme = Theme::from_builtin(name).expect("theme");
        let out = GraphRenderer::new(theme, RenderConfig::default(), ApproxMeasure).render(
            &network.entities,
            &network.relationships,
            &layout,
            &ViewState::new(),
            None,
        );
        let rect = elements(&out.svg)
            .into_iter()
            .find(|e| e.name == "rect" && e.has_class("background"))
            .expect("background rect");
        backgrounds.push(rect.attr("fill").map(str::to_string));
    }
    backgrounds.dedup();
    assert_eq!(backgrounds.len(), Theme::list_builtins().len());
}

#[test]
fn legend_keys_every_category_and_the_dash() {
    let families = || vec![family("a", "Alpha"), family("b", "Beta")];
    let rels = || vec![link("ab", "a", "b", Category::Blood, 0.5, true)];
    let positions = [("a", 100.0, 100.0), ("b", 300.0, 100.0)];

    let plain = render_with(families(), rels(), &positions, RenderOptions::default());
    assert!(elements(&plain.svg).iter().all(|e| !e.has_class("legend")));

    let keyed = render_with(
        families(),
        rels(),
        &positions,
        RenderOptions {
            legend: true,
            ..RenderOptions::default()
        },
    );
    let els = elements(&keyed.svg);
    assert_eq!(els.iter().filter(|e| e.has_class("legend")).count(), 1);
    let swatches: Vec<&Element> = els.iter().filter(|e| e.has_class("swatch")).collect();
    assert_eq!(swatches.len(), 6);

    let strokes: Vec<&str> = swatches[..4].iter().filter_map(|e| e.attr("stroke")).collect();
    assert_eq!(strokes, vec!["#e11d48", "#f59e0b", "#3b82f6", "#10b981"]);
    assert_eq!(swatches[4].attr("stroke-dasharray"), None);
    assert_eq!(swatches[5].attr("stroke-dasharray"), Some("8,4"));
}

#[test]
fn entities_at_negative_coordinates_stay_in_view() {
    let out = render(
        vec![family("a", "Alpha"), family("b", "Beta")],
        vec![link("ab", "a", "b", Category::Marriage, 0.7, true)],
        &[("a", -150.0, -150.0), ("b", 200.0, 200.0)],
        RenderConfig::vivid(),
    );
    let [x, y, width, height] = view_box(&out.svg);
    assert!(x < -150.0 && y < -150.0);
    assert!(x + width >= 800.0 && y + height >= 600.0);

    let node = elements(&out.svg)
        .into_iter()
        .find(|e| e.name == "circle" && e.has_class("core"))
        .expect("first node core");
    let cx: f64 = node.attr("cx").expect("cx").parse().expect("number");
    let cy: f64 = node.attr("cy").expect("cy").parse().expect("number");
    assert_eq!((cx, cy), (-150.0, -150.0));
    assert!(cx > x && cy > y);
    assert!(out.skipped.is_empty());
}
