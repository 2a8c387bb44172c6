use serde::Serialize;
use std::collections::HashMap;

/// Positional node identity: `(group, index within group)`. Stable across
/// re-layouts as long as the item keeps its slot; inserting or removing an
/// earlier line shifts every later id in that group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId {
    pub group: u32,
    pub index: u32,
}

impl NodeId {
    pub fn new(group: usize, index: usize) -> Self {
        Self {
            group: group as u32,
            index: index as u32,
        }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group, self.index)
    }
}

/// Viewport the scene is laid out against. The scene may grow beyond it
/// when the diagram needs the room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Label text wrapped to fit a circle, plus the radius that holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedLabel {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
}

/// One rendered circle. `x`/`y` are the final center (base + offset);
/// the base coordinates are kept so collaborators can tell manual
/// displacement apart from grid placement.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub level: usize,
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub base_x: f32,
    pub base_y: f32,
    pub lines: Vec<String>,
    pub fill: String,
    pub stroke: String,
    pub parent: Option<NodeId>,
    pub root: NodeId,
}

/// Parent-to-child connector with resolved endpoint centers.
#[derive(Debug, Clone, Serialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// The full contract handed to renderers and exporters: exact circle
/// centers, radii, colors, and wrapped label text. Sufficient to
/// rasterize or vectorize without re-running layout.
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub width: f32,
    pub height: f32,
}

impl Scene {
    pub fn empty(width: f32, height: f32) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            width,
            height,
        }
    }

    /// Distinct signal for a degenerate (empty or all-blank) document.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Topmost node under the given point, matching paint order (later
    /// nodes draw over earlier ones). This is how an interaction
    /// collaborator maps a pointer target back to a node.
    pub fn node_at(&self, x: f32, y: f32) -> Option<NodeId> {
        self.nodes
            .iter()
            .rev()
            .find(|node| {
                let dx = node.x - x;
                let dy = node.y - y;
                dx * dx + dy * dy <= node.r * node.r
            })
            .map(|node| node.id)
    }

    /// Pretty JSON form of the scene contract.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Parent-to-children index rebuilt on every layout pass; consulted only
/// for drag subtree selection.
pub type ChildrenMap = HashMap<NodeId, Vec<NodeId>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn test_node(id: NodeId, x: f32, y: f32, r: f32) -> Node {
        Node {
            id,
            level: 0,
            x,
            y,
            r,
            base_x: x,
            base_y: y,
            lines: vec!["n".to_string()],
            fill: "#ffffff".to_string(),
            stroke: "#000000".to_string(),
            parent: None,
            root: id,
        }
    }

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId::new(2, 5).to_string(), "2:5");
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let scene = Scene {
            nodes: vec![
                test_node(NodeId::new(0, 0), 50.0, 50.0, 30.0),
                test_node(NodeId::new(0, 1), 60.0, 50.0, 30.0),
            ],
            edges: Vec::new(),
            width: 200.0,
            height: 200.0,
        };
        assert_eq!(scene.node_at(55.0, 50.0), Some(NodeId::new(0, 1)));
        assert_eq!(scene.node_at(25.0, 50.0), Some(NodeId::new(0, 0)));
        assert_eq!(scene.node_at(150.0, 150.0), None);
    }

    #[test]
    fn empty_scene_signals_itself() {
        assert!(Scene::empty(600.0, 400.0).is_empty());
    }

    #[test]
    fn scene_serializes_to_json() {
        let scene = Scene::empty(10.0, 20.0);
        let json = scene.to_json().unwrap();
        assert!(json.contains("\"width\""));
        assert!(json.contains("\"nodes\""));
    }
}
