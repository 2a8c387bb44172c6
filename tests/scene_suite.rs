use std::path::Path;

use bubblemap::render::render_svg;
use bubblemap::{LayoutConfig, LayoutEngine, Scene, Theme, Viewport};

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

fn load_fixture(rel: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(rel);
    assert!(path.exists(), "fixture missing: {rel}");
    std::fs::read_to_string(path).expect("fixture read failed")
}

fn build_scene(input: &str) -> Scene {
    let mut engine = LayoutEngine::new(Theme::poppins(), LayoutConfig::default());
    engine
        .relayout(input, Viewport::new(1200.0, 800.0))
        .expect("layout pass failed")
}

// Keep this list explicit so new fixtures must be added intentionally.
const FIXTURES: [&str; 6] = [
    "basic.txt",
    "groups.txt",
    "deep.txt",
    "dense.txt",
    "long_words.txt",
    "irregular_indent.txt",
];

#[test]
fn render_all_fixtures() {
    for rel in FIXTURES {
        let input = load_fixture(rel);
        let scene = build_scene(&input);
        assert!(!scene.is_empty(), "{rel}: expected a non-empty scene");
        let svg = render_svg(&scene, &Theme::poppins());
        assert_valid_svg(&svg, rel);
        assert_eq!(
            svg.matches("<circle").count(),
            scene.nodes.len(),
            "{rel}: one circle per node"
        );
    }
}

#[test]
fn every_fixture_respects_radius_bounds() {
    for rel in FIXTURES {
        let scene = build_scene(&load_fixture(rel));
        for node in &scene.nodes {
            assert!(
                (16.0..=100.0).contains(&node.r),
                "{rel}: node {} radius {} out of bounds",
                node.id,
                node.r
            );
        }
    }
}

#[test]
fn every_fixture_links_nodes_into_a_forest() {
    for rel in FIXTURES {
        let scene = build_scene(&load_fixture(rel));
        let roots = scene.nodes.iter().filter(|n| n.parent.is_none()).count();
        assert_eq!(
            scene.edges.len(),
            scene.nodes.len() - roots,
            "{rel}: one edge per non-root node"
        );
        for edge in &scene.edges {
            let child = scene.node(edge.to).expect("edge child exists");
            let parent = scene.node(edge.from).expect("edge parent exists");
            assert!(
                child.level > parent.level,
                "{rel}: child level must exceed parent level"
            );
        }
    }
}

#[test]
fn fixtures_settle_across_repeated_passes() {
    for rel in FIXTURES {
        let input = load_fixture(rel);
        let mut engine = LayoutEngine::new(Theme::poppins(), LayoutConfig::default());
        let viewport = Viewport::new(1200.0, 800.0);
        let mut prev = engine.relayout(&input, viewport).unwrap();
        let mut delta = f32::MAX;
        for _ in 0..8 {
            let next = engine.relayout(&input, viewport).unwrap();
            delta = prev
                .nodes
                .iter()
                .zip(next.nodes.iter())
                .map(|(a, b)| (a.x - b.x).abs().max((a.y - b.y).abs()))
                .fold(0.0, f32::max);
            prev = next;
        }
        assert!(delta < 1.0, "{rel}: did not settle, final delta {delta}");
    }
}

#[test]
fn scene_json_is_machine_readable() {
    let scene = build_scene(&load_fixture("basic.txt"));
    let json = scene.to_json().expect("serialize scene");
    let value: serde_json::Value = serde_json::from_str(&json).expect("parse scene json");
    assert_eq!(
        value["nodes"].as_array().map(Vec::len),
        Some(scene.nodes.len())
    );
    assert!(value["width"].as_f64().unwrap() > 0.0);
    assert!(value["nodes"][0]["lines"].is_array());
}

#[test]
fn blank_document_renders_placeholder() {
    let mut engine = LayoutEngine::new(Theme::poppins(), LayoutConfig::default());
    let scene = engine
        .relayout("\n \n\t\n", Viewport::new(1200.0, 800.0))
        .unwrap();
    assert!(scene.is_empty());
    let svg = render_svg(&scene, &Theme::poppins());
    assert_valid_svg(&svg, "blank");
    assert!(svg.contains("Type an outline"));
}
