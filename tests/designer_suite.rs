use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use flow_designer::config::{Config, LayoutConfig, LayoutEngine};
use flow_designer::layout::LayoutResult;
use flow_designer::measure::{NodeSize, measure_pages};
use flow_designer::store::{DataService, get_data, put_data};
use flow_designer::theme::Theme;
use flow_designer::{
    Designer, Document, FileStore, MemoryStore, Page, SyncError, compute_layout, project, schema,
};
use pretty_assertions::assert_eq;
use serde_json::Value;

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> Document {
    let raw = std::fs::read_to_string(fixture_path(name)).expect("fixture read failed");
    let value: Value = serde_json::from_str(&raw).expect("fixture is not JSON");
    schema::validate(value).expect("fixture is not a valid document")
}

fn layout_for(doc: &Document, engine: LayoutEngine) -> LayoutResult {
    let config = LayoutConfig {
        engine,
        ..LayoutConfig::default()
    };
    let sizes = measure_pages(&doc.pages, &Theme::designer(), &config);
    compute_layout(&project(&doc.pages, &sizes), &config)
}

fn layered_config() -> Config {
    let mut config = Config::default();
    config.layout.engine = LayoutEngine::Layered;
    config
}

#[test]
fn node_set_matches_page_paths() {
    for name in ["linear.json", "branching.json"] {
        let doc = load_fixture(name);
        let graph = project(&doc.pages, &vec![NodeSize::new(100.0, 40.0); doc.pages.len()]);
        let nodes: BTreeSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        let paths: BTreeSet<&str> = doc.page_paths().into_iter().collect();
        assert_eq!(nodes, paths, "{name}");
    }
}

#[test]
fn dangling_links_are_excluded() {
    let doc = load_fixture("linear.json");
    let graph = project(&doc.pages, &vec![NodeSize::new(100.0, 40.0); 3]);
    let edges: Vec<(&str, &str)> = graph
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();
    assert_eq!(edges, vec![("/start", "/middle"), ("/middle", "/end")]);

    let branching = load_fixture("branching.json");
    let graph = project(&branching.pages, &vec![NodeSize::new(100.0, 40.0); 5]);
    assert!(!graph.edges.iter().any(|e| e.target == "/archived"));
}

#[test]
fn linear_flow_ranks_left_to_right() {
    let doc = load_fixture("linear.json");
    for engine in [LayoutEngine::Layered, LayoutEngine::Dagre] {
        let layout = layout_for(&doc, engine);
        let start = layout.node("/start").unwrap();
        let middle = layout.node("/middle").unwrap();
        let end = layout.node("/end").unwrap();
        assert!(start.center().x < middle.center().x, "{engine:?}");
        assert!(middle.center().x < end.center().x, "{engine:?}");
    }
}

#[test]
fn layout_is_index_aligned_and_bounded() {
    for name in ["linear.json", "branching.json"] {
        let doc = load_fixture(name);
        for engine in [LayoutEngine::Layered, LayoutEngine::Dagre] {
            let layout = layout_for(&doc, engine);
            let ids: Vec<&str> = layout.nodes.iter().map(|n| n.id.as_str()).collect();
            assert_eq!(ids, doc.page_paths(), "{name} {engine:?}");
            for node in &layout.nodes {
                assert!(node.right() <= layout.width, "{name} {engine:?} {}", node.id);
                assert!(node.bottom() <= layout.height, "{name} {engine:?} {}", node.id);
                assert!(node.left >= 0.0 && node.top >= 0.0);
            }
            for edge in &layout.edges {
                for point in &edge.points {
                    assert!(point.x >= 0.0 && point.x <= layout.width);
                    assert!(point.y >= 0.0 && point.y <= layout.height);
                }
            }
        }
    }
}

#[test]
fn layout_is_deterministic() {
    let doc = load_fixture("branching.json");
    for engine in [LayoutEngine::Layered, LayoutEngine::Dagre] {
        let first = serde_json::to_value(layout_for(&doc, engine)).unwrap();
        let second = serde_json::to_value(layout_for(&doc, engine)).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn save_round_trip_relays_out_once() {
    let store = MemoryStore::new(load_fixture("linear.json"));
    let mut designer = Designer::open(store, layered_config()).unwrap();
    assert_eq!(designer.scheduler().passes(), 1);

    let mut candidate = (*designer.current().unwrap().doc).clone();
    candidate.pages.push(Page::new("/missing"));
    let snapshot = designer.save(&candidate).unwrap();

    assert_eq!(*snapshot.doc, candidate);
    assert_eq!(*designer.controller().service().fetch().unwrap(), candidate);
    assert_eq!(designer.scheduler().passes(), 2);
    let layout = designer.layout().unwrap();
    assert_eq!(layout.nodes.len(), 4);
    assert!(layout.edge("/middle", "/missing").is_some());
}

#[test]
fn rejected_save_leaves_document_unchanged() {
    let store = MemoryStore::new(load_fixture("linear.json"));
    let mut designer = Designer::open(store, layered_config()).unwrap();
    let before = designer.current().unwrap().clone();

    let candidate = serde_json::json!({ "pages": [{ "next": [] }] });
    let err = designer.save_value(candidate).unwrap_err();
    assert!(matches!(err, SyncError::Rejected(_)));

    let after = designer.current().unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(*after.doc, *before.doc);
    assert_eq!(designer.scheduler().passes(), 1);
}

#[test]
fn file_store_persists_accepted_documents_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("form.json");
    std::fs::copy(fixture_path("branching.json"), &path).unwrap();
    let store = FileStore::open(&path).unwrap();

    let invalid = std::fs::read_to_string(fixture_path("duplicate_paths.json")).unwrap();
    let response = put_data(&store, &invalid);
    assert_eq!(response.status, 422);
    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["pages"].as_array().unwrap().len(), 5);

    let response = put_data(&store, r#"{ "pages": [{ "path": "/only" }], "startPage": "/only" }"#);
    assert!(response.is_success());
    let reopened = FileStore::open(&path).unwrap();
    let doc = reopened.fetch().unwrap();
    assert_eq!(doc.page_paths(), vec!["/only"]);
    assert_eq!(doc.extra["startPage"], Value::from("/only"));

    let download = get_data(&reopened, true);
    assert_eq!(download.content_type, "application/json");
    assert!(download.body.contains("\n"));
}

#[test]
fn unknown_fields_survive_a_save() {
    let store = MemoryStore::new(load_fixture("branching.json"));
    let mut designer = Designer::open(store, layered_config()).unwrap();
    designer.add_link("/guardian", "/summary", None).unwrap();
    let saved = designer.controller().service().fetch().unwrap().to_value();
    assert_eq!(saved["startPage"], Value::from("/start"));
    assert_eq!(saved["pages"][0]["components"][0]["content"], Value::from("Apply for a licence"));
}

#[test]
fn rendered_canvas_and_minimap_share_geometry() {
    let store = MemoryStore::new(load_fixture("branching.json"));
    let designer = Designer::open(store, layered_config()).unwrap();
    let svg = designer.render().unwrap();
    let layout = designer.layout().unwrap();
    let scale = designer.config().render.minimap_scale;
    for node in &layout.nodes {
        assert!(svg.contains(&format!("<g class=\"page\" id=\"{}\"", node.id)));
        assert!(svg.contains(&format!("x=\"{:.2}\" y=\"{:.2}\"", node.left, node.top)));
        let (mini_x, mini_y) = (node.left * scale, node.top * scale);
        assert!(svg.contains(&format!("x=\"{mini_x:.2}\" y=\"{mini_y:.2}\"")));
    }
    assert_eq!(svg.matches("class=\"link\"").count(), layout.edges.len());
}
