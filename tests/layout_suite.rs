use std::path::Path;

use family_tree_renderer::layout::{Diagnostic, EdgeKind, Layout};
use family_tree_renderer::{
    Config, FamilyTree, LayoutConfig, PersonStore, Theme, TreeHost, TreeView, ViewTransform,
    ViewportController, ViewportSize, compute_layout, parse_family_tree, person_details,
    render_svg,
};

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

fn load_fixture(name: &str) -> FamilyTree {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    let tree = parse_family_tree(&input).expect("parse failed");
    PersonStore::from_tree(tree).snapshot()
}

fn row(layout: &Layout, generation: usize) -> Vec<&str> {
    layout
        .nodes
        .iter()
        .filter(|n| n.generation == generation)
        .map(|n| n.id.as_str())
        .collect()
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = [
        "sample_family.json",
        "legacy_vanilla.json5",
        "partial_parents.json",
        "cyclic.json",
    ];

    let config = LayoutConfig::default();
    for name in candidates {
        let tree = load_fixture(name);
        for width in [1920.0, 800.0, 0.0] {
            let layout = compute_layout(&tree, &config, width);
            assert_eq!(layout.nodes.len(), tree.len(), "{name}: every member placed once");
            for edge in &layout.edges {
                for id in edge.endpoints() {
                    assert!(layout.node(id).is_some(), "{name}: edge to unplaced {id}");
                }
            }
            for theme in [Theme::parchment(), Theme::midnight()] {
                let svg = render_svg(&layout, &tree, &theme, &config, ViewTransform::IDENTITY);
                assert_valid_svg(&svg, name);
                assert_eq!(svg.matches("class=\"node\"").count(), tree.len());
            }
        }
    }
}

#[test]
fn sample_family_generations() {
    let tree = load_fixture("sample_family.json");
    let layout = compute_layout(&tree, &LayoutConfig::default(), 1920.0);
    let generation = |id: &str| layout.generations.get(id);
    for (id, expected) in [
        ("1", 0),
        ("2", 0),
        ("3", 1),
        ("4", 1),
        ("5", 1),
        ("6", 1),
        ("7", 2),
        ("8", 2),
        ("9", 2),
    ] {
        assert_eq!(generation(id), Some(expected), "generation of {id}");
    }
    assert!(layout.generations.diagnostics.is_empty());
}

#[test]
fn sample_family_rows_keep_spouses_together() {
    let tree = load_fixture("sample_family.json");
    let config = LayoutConfig::default();
    let layout = compute_layout(&tree, &config, 1920.0);

    assert_eq!(row(&layout, 0), vec!["1", "2"]);
    assert_eq!(row(&layout, 1), vec!["3", "5", "4", "6"]);
    assert_eq!(row(&layout, 2), vec!["7", "8", "9"]);

    for generation in 0..3 {
        let nodes: Vec<_> = layout
            .nodes
            .iter()
            .filter(|n| n.generation == generation)
            .collect();
        for pair in nodes.windows(2) {
            assert_eq!(pair[1].x - pair[0].x, config.horizontal_spacing);
            assert_eq!(pair[0].y, pair[1].y);
        }
        let center = (nodes[0].x + nodes[nodes.len() - 1].x) / 2.0;
        assert!((center - 960.0).abs() < 1e-3);
    }
}

#[test]
fn sample_family_connectors() {
    let tree = load_fixture("sample_family.json");
    let layout = compute_layout(&tree, &LayoutConfig::default(), 1920.0);

    let parent_child: Vec<_> = layout
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::ParentChild)
        .collect();
    let spouse_ties = layout
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Spouse)
        .count();
    assert_eq!(parent_child.len(), 5);
    assert_eq!(spouse_ties, 3);

    let to_michael = parent_child.iter().find(|e| e.target == "7").unwrap();
    assert_eq!(to_michael.sources, vec!["3", "5"]);
    let robert = layout.node("3").unwrap();
    let susan = layout.node("5").unwrap();
    let michael = layout.node("7").unwrap();
    let mid_x = (robert.x + susan.x) / 2.0;
    let mid_y = (robert.y + michael.y) / 2.0;
    assert_eq!(
        to_michael.points,
        vec![
            (mid_x, robert.y),
            (mid_x, mid_y),
            (michael.x, mid_y),
            (michael.x, michael.y - 100.0),
        ]
    );
}

#[test]
fn deleting_a_parent_leaves_single_parent_connectors() {
    let tree = load_fixture("sample_family.json");
    let mut store = PersonStore::from_tree(tree);
    let removed = store.remove("2").expect("Mary exists");
    assert_eq!(removed.name, "Mary Smith");

    let snapshot = store.snapshot();
    for person in snapshot.iter() {
        assert!(!person.parents.iter().any(|p| p == "2"));
        assert!(!person.spouses.iter().any(|s| s == "2"));
        assert!(!person.children.iter().any(|c| c == "2"));
    }

    let layout = compute_layout(&snapshot, &LayoutConfig::default(), 1920.0);
    assert_eq!(row(&layout, 0), vec!["1"]);
    let john = layout.node("1").unwrap();
    assert_eq!(john.x, 960.0);
    for child in ["3", "4"] {
        let edge = layout.edges.iter().find(|e| e.target == child).unwrap();
        assert_eq!(edge.sources, vec!["1"]);
        assert_eq!(edge.points[0], (john.x, john.y));
    }
    assert!(layout.edges.iter().all(|e| e.endpoints().all(|id| id != "2")));
}

#[test]
fn deleting_a_spouse_routes_child_from_remaining_parent() {
    let tree = load_fixture("sample_family.json");
    let mut store = PersonStore::from_tree(tree);
    let removed = store.remove("5").expect("Susan exists");
    assert_eq!(removed.name, "Susan Smith");

    let snapshot = store.snapshot();
    assert_eq!(snapshot.get("7").unwrap().parents, vec!["3"]);
    assert!(snapshot.get("3").unwrap().spouses.is_empty());

    let layout = compute_layout(&snapshot, &LayoutConfig::default(), 1920.0);
    assert_eq!(layout.generations.get("7"), Some(2));
    assert_eq!(row(&layout, 1), vec!["3", "4", "6"]);

    let robert = layout.node("3").unwrap();
    let to_michael = layout.edges.iter().find(|e| e.target == "7").unwrap();
    assert_eq!(to_michael.sources, vec!["3"]);
    assert_eq!(to_michael.points[0], (robert.x, robert.y));
    assert!(layout.edges.iter().all(|e| e.endpoints().all(|id| id != "5")));
}

#[test]
fn legacy_document_is_normalized() {
    let tree = load_fixture("legacy_vanilla.json5");
    assert_eq!(tree.len(), 6);
    // `spouse: 2` on Arthur becomes a symmetric link.
    assert_eq!(tree.get("2").unwrap().spouses, vec!["1"]);
    assert_eq!(tree.get("1").unwrap().children, vec!["3"]);

    let layout = compute_layout(&tree, &LayoutConfig::default(), 1200.0);
    assert_eq!(row(&layout, 0), vec!["1", "2"]);
    assert_eq!(row(&layout, 1), vec!["3", "4"]);
    assert_eq!(row(&layout, 2), vec!["5", "6"]);
}

#[test]
fn missing_parent_is_a_diagnostic_not_an_error() {
    let tree = load_fixture("partial_parents.json");
    let layout = compute_layout(&tree, &LayoutConfig::default(), 1920.0);
    assert!(layout.generations.diagnostics.iter().any(|d| matches!(
        d,
        Diagnostic::MissingReference { from, to, .. } if from == "lena" && to == "unknown-father"
    )));
    assert_eq!(layout.generations.get("lena"), Some(1));
    assert_eq!(layout.generations.get("nils"), Some(1));

    let to_lena = layout.edges.iter().find(|e| e.target == "lena").unwrap();
    assert_eq!(to_lena.sources, vec!["anna"]);

    let ola = tree.get("ola").unwrap();
    assert_eq!(person_details(ola).birth_date, "Not recorded");
    assert_eq!(person_details(ola).lifespan, "?");
}

#[test]
fn cyclic_ancestry_terminates() {
    let tree = load_fixture("cyclic.json");
    let layout = compute_layout(&tree, &LayoutConfig::default(), 1920.0);
    assert_eq!(layout.nodes.len(), 4);
    let cycles = layout
        .generations
        .diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::CyclicAncestry { .. }))
        .count();
    assert_eq!(cycles, 2);
    let a = layout.generations.get("a").unwrap();
    let c = layout.generations.get("c").unwrap();
    assert_eq!(c, a + 1);
}

struct FixtureHost {
    store: PersonStore,
    size: ViewportSize,
    selected: Option<String>,
}

impl TreeHost for FixtureHost {
    fn snapshot(&self) -> FamilyTree {
        self.store.snapshot()
    }

    fn viewport_size(&self) -> ViewportSize {
        self.size
    }

    fn on_select(&mut self, id: &str) {
        self.selected = Some(id.to_string());
    }
}

#[test]
fn resize_recenters_rows() {
    let mut host = FixtureHost {
        store: PersonStore::from_tree(load_fixture("sample_family.json")),
        size: ViewportSize {
            width: 1920.0,
            height: 1080.0,
        },
        selected: None,
    };
    let mut view = TreeView::new(&Config::default(), &host);
    let wide = view.layout().clone();

    host.size = ViewportSize {
        width: 800.0,
        height: 600.0,
    };
    assert!(view.resize(&host));
    let narrow = view.layout();
    assert_eq!(view.layout_passes(), 2);

    for generation in 0..3 {
        assert_eq!(row(&wide, generation), row(narrow, generation));
    }
    for (before, after) in wide.nodes.iter().zip(&narrow.nodes) {
        assert_eq!(before.y, after.y);
        assert!((before.x - 960.0 - (after.x - 400.0)).abs() < 1e-3);
    }

    let michael = view.layout().node("7").unwrap().clone();
    view.activate_at(michael.x, michael.y, &mut host);
    assert_eq!(host.selected.as_deref(), Some("7"));
}

#[test]
fn zoom_never_leaves_configured_range() {
    let mut viewport = ViewportController::default();
    for _ in 0..50 {
        viewport.zoom_in();
        assert!(viewport.transform().scale <= 3.0);
    }
    for _ in 0..50 {
        viewport.wheel(100.0);
        assert!(viewport.transform().scale >= 0.3);
    }
}

#[test]
fn transform_applies_to_both_layers() {
    let tree = load_fixture("sample_family.json");
    let config = LayoutConfig::default();
    let layout = compute_layout(&tree, &config, 1920.0);
    let mut viewport = ViewportController::default();
    viewport.pointer_down(0.0, 0.0);
    viewport.pointer_move(-120.0, 35.0);
    viewport.pointer_up();
    viewport.zoom_out();
    let transform = viewport.transform();

    let svg = render_svg(&layout, &tree, &Theme::parchment(), &config, transform);
    let attr = format!("transform=\"{}\"", transform.to_svg());
    assert_eq!(svg.matches(&attr).count(), 2);
}
