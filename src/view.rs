use serde::Serialize;

use crate::config::{Config, LayoutConfig};
use crate::layout::{EdgeLayout, Layout, NodePosition, compute_layout};
use crate::model::FamilyTree;
use crate::render::render_svg;
use crate::theme::Theme;
use crate::viewport::{ViewTransform, ViewportController};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// The application side of the tree view: owns the person data, knows the
/// size of the surface the tree is drawn on and reacts to node selection.
pub trait TreeHost {
    /// Immutable copy of the current member set, taken before a layout pass.
    fn snapshot(&self) -> FamilyTree;

    fn viewport_size(&self) -> ViewportSize;

    fn on_select(&mut self, id: &str);
}

/// Keeps the latest layout for a host and the pan/zoom state on top of it.
///
/// Gestures only touch the viewport; a layout pass runs when the host's
/// snapshot changes or the viewport is resized.
#[derive(Debug)]
pub struct TreeView {
    layout_config: LayoutConfig,
    theme: Theme,
    viewport: ViewportController,
    tree: FamilyTree,
    size: ViewportSize,
    layout: Layout,
    layout_passes: usize,
}

impl TreeView {
    pub fn new(config: &Config, host: &impl TreeHost) -> Self {
        let mut view = Self {
            layout_config: config.layout.sanitized(),
            theme: config.theme.clone(),
            viewport: ViewportController::new(config.viewport.clone()),
            tree: host.snapshot(),
            size: host.viewport_size(),
            layout: Layout::default(),
            layout_passes: 0,
        };
        view.relayout();
        view
    }

    fn relayout(&mut self) {
        self.layout = compute_layout(&self.tree, &self.layout_config, self.size.width);
        self.layout_passes += 1;
    }

    /// Re-reads the host snapshot. Returns whether a layout pass ran.
    pub fn refresh(&mut self, host: &impl TreeHost) -> bool {
        let snapshot = host.snapshot();
        if same_snapshot(&snapshot, &self.tree) {
            return false;
        }
        tracing::debug!(members = snapshot.len(), "snapshot changed, relayout");
        self.tree = snapshot;
        self.relayout();
        true
    }

    /// Re-queries the viewport size. Returns whether a layout pass ran.
    pub fn resize(&mut self, host: &impl TreeHost) -> bool {
        let size = host.viewport_size();
        if size == self.size {
            return false;
        }
        let width_changed = size.width != self.size.width;
        self.size = size;
        // Row centering only depends on the width.
        if width_changed {
            tracing::debug!(width = size.width, "viewport resized, relayout");
            self.relayout();
        }
        width_changed
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn tree(&self) -> &FamilyTree {
        &self.tree
    }

    pub fn positions(&self) -> &[NodePosition] {
        &self.layout.nodes
    }

    pub fn edges(&self) -> &[EdgeLayout] {
        &self.layout.edges
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn transform(&self) -> ViewTransform {
        self.viewport.transform()
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportController {
        &mut self.viewport
    }

    pub fn layout_passes(&self) -> usize {
        self.layout_passes
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.viewport.pointer_down(x, y);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.viewport.pointer_move(x, y)
    }

    pub fn pointer_up(&mut self) {
        self.viewport.pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.viewport.pointer_leave();
    }

    pub fn wheel(&mut self, delta_y: f32) -> f32 {
        self.viewport.wheel(delta_y)
    }

    /// Id of the card under a screen point, if any.
    pub fn node_at(&self, screen_x: f32, screen_y: f32) -> Option<&str> {
        let (x, y) = self.transform().screen_to_scene(screen_x, screen_y);
        let half_w = self.layout_config.node_width / 2.0;
        let half_h = self.layout_config.node_height / 2.0;
        // Later cards are drawn on top.
        self.layout
            .nodes
            .iter()
            .rev()
            .find(|node| (x - node.x).abs() <= half_w && (y - node.y).abs() <= half_h)
            .map(|node| node.id.as_str())
    }

    /// Hit-tests a click and forwards the selected id to the host.
    pub fn activate_at(
        &self,
        screen_x: f32,
        screen_y: f32,
        host: &mut impl TreeHost,
    ) -> Option<String> {
        let id = self.node_at(screen_x, screen_y)?.to_string();
        host.on_select(&id);
        Some(id)
    }

    pub fn render_svg(&self) -> String {
        render_svg(
            &self.layout,
            &self.tree,
            &self.theme,
            &self.layout_config,
            self.transform(),
        )
    }
}

// IndexMap equality ignores order, but store order drives placement.
fn same_snapshot(a: &FamilyTree, b: &FamilyTree) -> bool {
    a.root_member_id == b.root_member_id && a.members.iter().eq(b.members.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Person;
    use crate::store::PersonStore;

    struct Host {
        store: PersonStore,
        size: ViewportSize,
        selected: Vec<String>,
    }

    impl TreeHost for Host {
        fn snapshot(&self) -> FamilyTree {
            self.store.snapshot()
        }

        fn viewport_size(&self) -> ViewportSize {
            self.size
        }

        fn on_select(&mut self, id: &str) {
            self.selected.push(id.to_string());
        }
    }

    fn host() -> Host {
        let tree = FamilyTree::from_members([
            Person::new("1", "John").with_spouses(&["2"]),
            Person::new("2", "Mary").with_spouses(&["1"]),
            Person::new("3", "Robert").with_parents(&["1", "2"]),
        ]);
        Host {
            store: PersonStore::from_tree(tree),
            size: ViewportSize::default(),
            selected: Vec::new(),
        }
    }

    #[test]
    fn gestures_do_not_relayout() {
        let host = host();
        let mut view = TreeView::new(&Config::default(), &host);
        assert_eq!(view.layout_passes(), 1);
        view.pointer_down(10.0, 10.0);
        view.pointer_move(200.0, 50.0);
        view.pointer_up();
        view.wheel(-1.0);
        view.viewport_mut().zoom_in();
        assert!(!view.refresh(&host));
        assert_eq!(view.layout_passes(), 1);
        assert_eq!(view.transform().pan_x, 190.0);
    }

    #[test]
    fn store_change_triggers_relayout() {
        let mut host = host();
        let mut view = TreeView::new(&Config::default(), &host);
        host.store
            .insert(Person::new("4", "Anna").with_parents(&["3"]))
            .unwrap();
        assert!(view.refresh(&host));
        assert_eq!(view.layout_passes(), 2);
        assert_eq!(view.positions().len(), 4);
        assert_eq!(view.tree().len(), 4);
        assert!(view.tree().contains("4"));
    }

    #[test]
    fn resize_recenters_without_reordering() {
        let mut host = host();
        let mut view = TreeView::new(&Config::default(), &host);
        let before: Vec<NodePosition> = view.positions().to_vec();

        host.size = ViewportSize {
            width: 800.0,
            height: 600.0,
        };
        assert!(view.resize(&host));
        let after = view.positions();

        let ids = |nodes: &[NodePosition]| nodes.iter().map(|n| n.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&before), ids(after));
        for (a, b) in before.iter().zip(after) {
            assert_eq!(a.y, b.y);
            assert_eq!(a.x - 960.0, b.x - 400.0);
        }
        let robert = view.layout().node("3").unwrap();
        assert_eq!(robert.x, 400.0);
    }

    #[test]
    fn height_only_resize_keeps_layout() {
        let mut host = host();
        let mut view = TreeView::new(&Config::default(), &host);
        host.size.height = 500.0;
        assert!(!view.resize(&host));
        assert_eq!(view.layout_passes(), 1);
        assert_eq!(view.size().height, 500.0);
    }

    #[test]
    fn activate_selects_node_under_pointer() {
        let mut host = host();
        let mut view = TreeView::new(&Config::default(), &host);
        let robert = view.layout().node("3").unwrap().clone();

        assert_eq!(
            view.activate_at(robert.x, robert.y, &mut host).as_deref(),
            Some("3")
        );
        assert_eq!(view.activate_at(5.0, 5.0, &mut host), None);

        view.viewport_mut().set_scale(2.0);
        view.viewport_mut().set_pan(-100.0, 20.0);
        let (sx, sy) = view.transform().apply(robert.x, robert.y);
        assert_eq!(view.activate_at(sx, sy, &mut host).as_deref(), Some("3"));
        assert_eq!(host.selected, vec!["3", "3"]);
    }

    #[test]
    fn rendered_view_uses_current_transform() {
        let host = host();
        let mut view = TreeView::new(&Config::default(), &host);
        view.viewport_mut().set_pan(15.0, 25.0);
        let svg = view.render_svg();
        assert!(svg.contains("translate(15 25) scale(1)"));
    }

    #[test]
    fn hit_test_uses_sanitized_card_size() {
        let mut host = host();
        let mut config = Config::default();
        config.layout.node_width = f32::NAN;
        let view = TreeView::new(&config, &host);
        let robert = view.layout().node("3").unwrap().clone();
        assert!(robert.x.is_finite());

        // Card width falls back to one unit, so half a unit either side hits.
        assert_eq!(
            view.activate_at(robert.x + 0.4, robert.y, &mut host).as_deref(),
            Some("3")
        );
        assert_eq!(view.activate_at(robert.x + 0.6, robert.y, &mut host), None);
    }
}
