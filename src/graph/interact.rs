use super::render::{MARKER_RADIUS, Scene};
use super::types::{Entity, EntityId, Point, Relationship};

/// Callbacks fired by [`PointerRouter`]. Every method defaults to a no-op.
pub trait GraphEvents {
    fn on_entity_select(&mut self, _entity: &Entity) {}

    /// `None` when the pointer leaves the last hovered entity.
    fn on_entity_hover(&mut self, _entity: Option<&Entity>) {}

    fn on_relationship_click(&mut self, _relationship: &Relationship) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move(Point),
    Click(Point),
    Leave,
}

/// What sits under a pointer position.
#[derive(Debug, Clone, Copy)]
pub enum Hit<'a> {
    Entity(&'a Entity),
    Relationship(&'a Relationship),
}

/// Topmost thing under `at`. Nodes are drawn in order, so the last match
/// wins. Markers sit below the nodes and only exist in interactive scenes.
pub fn hit_test<'a>(scene: &Scene<'a>, at: Point) -> Option<Hit<'a>> {
    if let Some(node) = scene
        .nodes
        .iter()
        .rev()
        .find(|n| n.center.distance(at) <= n.radius)
    {
        return Some(Hit::Entity(node.entity));
    }
    if !scene.interactive {
        return None;
    }
    scene
        .connections
        .iter()
        .rev()
        .find(|c| c.marker.distance(at) <= MARKER_RADIUS)
        .map(|c| Hit::Relationship(c.relationship))
}

/// Turns raw pointer events into [`GraphEvents`] calls, tracking hover so
/// enter and leave are each reported once.
#[derive(Debug, Default)]
pub struct PointerRouter {
    hovered: Option<EntityId>,
}

impl PointerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<&EntityId> {
        self.hovered.as_ref()
    }

    pub fn dispatch(
        &mut self,
        scene: &Scene<'_>,
        event: PointerEvent,
        events: &mut dyn GraphEvents,
    ) {
        match event {
            PointerEvent::Move(at) => {
                let entity = match hit_test(scene, at) {
                    Some(Hit::Entity(entity)) => Some(entity),
                    _ => None,
                };
                if entity.map(|e| &e.id) == self.hovered.as_ref() {
                    return;
                }
                self.hovered = entity.map(|e| e.id.clone());
                events.on_entity_hover(entity);
            }
            PointerEvent::Click(at) => match hit_test(scene, at) {
                Some(Hit::Entity(entity)) => events.on_entity_select(entity),
                Some(Hit::Relationship(rel)) => events.on_relationship_click(rel),
                None => {}
            },
            PointerEvent::Leave => {
                if self.hovered.take().is_some() {
                    events.on_entity_hover(None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::graph::layout::LayoutProvider;
    use crate::graph::registry::{EntityRegistry, RelationshipRegistry};
    use crate::graph::render::RenderOptions;
    use crate::graph::sample;
    use crate::graph::view::ViewState;

    #[derive(Default)]
    struct Recorder {
        selected: Vec<String>,
        hovers: Vec<Option<String>>,
        clicked: Vec<String>,
    }

    impl GraphEvents for Recorder {
        fn on_entity_select(&mut self, entity: &Entity) {
            self.selected.push(entity.id.to_string());
        }

        fn on_entity_hover(&mut self, entity: Option<&Entity>) {
            self.hovers.push(entity.map(|e| e.id.to_string()));
        }

        fn on_relationship_click(&mut self, relationship: &Relationship) {
            self.clicked.push(relationship.id.to_string());
        }
    }

    struct Silent;
    impl GraphEvents for Silent {}

    fn with_scene(interactive: bool, f: impl FnOnce(&Scene<'_>)) {
        let fams = EntityRegistry::new(sample::families()).expect("families");
        let rels = RelationshipRegistry::new(sample::connections()).expect("connections");
        let coords = sample::authored_layout().layout(&fams);
        let entities: Vec<&Entity> = fams.iter().collect();
        let relationships: Vec<&Relationship> = rels.iter().collect();
        let scene = Scene::build(
            &entities,
            &relationships,
            &coords,
            &ViewState::new(),
            &RenderConfig::default(),
            RenderOptions {
                interactive,
                ..RenderOptions::default()
            },
        );
        f(&scene);
    }

    #[test]
    fn click_on_node_selects_it() {
        with_scene(false, |scene| {
            let mut rec = Recorder::default();
            let mut router = PointerRouter::new();
            router.dispatch(scene, PointerEvent::Click(Point::new(203.0, 118.0)), &mut rec);
            assert_eq!(rec.selected, vec!["fam_01"]);
        });
    }

    #[test]
    fn hover_enter_and_leave_fire_once() {
        with_scene(false, |scene| {
            let mut rec = Recorder::default();
            let mut router = PointerRouter::new();
            let on_node = Point::new(600.0, 120.0);
            router.dispatch(scene, PointerEvent::Move(on_node), &mut rec);
            router.dispatch(scene, PointerEvent::Move(Point::new(602.0, 121.0)), &mut rec);
            router.dispatch(scene, PointerEvent::Move(Point::new(400.0, 20.0)), &mut rec);
            router.dispatch(scene, PointerEvent::Leave, &mut rec);
            assert_eq!(rec.hovers, vec![Some("fam_04".to_string()), None]);
            assert_eq!(router.hovered(), None);
        });
    }

    #[test]
    fn leave_reports_exit_from_a_hovered_node() {
        with_scene(false, |scene| {
            let mut rec = Recorder::default();
            let mut router = PointerRouter::new();
            router.dispatch(scene, PointerEvent::Move(Point::new(400.0, 370.0)), &mut rec);
            router.dispatch(scene, PointerEvent::Leave, &mut rec);
            assert_eq!(rec.hovers, vec![Some("fam_06".to_string()), None]);
        });
    }

    #[test]
    fn markers_are_clickable_only_in_interactive_scenes() {
        // conn_09 runs fam_01 (200,120) -> fam_10 (140,400).
        let marker = Point::new(170.0, 260.0);
        with_scene(false, |scene| {
            let mut rec = Recorder::default();
            PointerRouter::new().dispatch(scene, PointerEvent::Click(marker), &mut rec);
            assert!(rec.clicked.is_empty());
        });
        with_scene(true, |scene| {
            let mut rec = Recorder::default();
            PointerRouter::new().dispatch(scene, PointerEvent::Click(marker), &mut rec);
            assert_eq!(rec.clicked, vec!["conn_09"]);
        });
    }

    #[test]
    fn default_callbacks_are_no_ops() {
        with_scene(true, |scene| {
            let mut router = PointerRouter::new();
            router.dispatch(scene, PointerEvent::Click(Point::new(200.0, 120.0)), &mut Silent);
            router.dispatch(scene, PointerEvent::Move(Point::new(200.0, 120.0)), &mut Silent);
            assert_eq!(router.hovered(), Some(&EntityId::new("fam_01")));
        });
    }

    #[test]
    fn empty_space_does_nothing() {
        with_scene(true, |scene| {
            let mut rec = Recorder::default();
            let corner = PointerEvent::Click(Point::new(790.0, 10.0));
            PointerRouter::new().dispatch(scene, corner, &mut rec);
            assert!(rec.selected.is_empty());
            assert!(rec.clicked.is_empty());
        });
    }
}
