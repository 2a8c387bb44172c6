//! Scene assembly: base-grid placement, parent/root linkage, branch
//! coloring, and the relaxation hand-off. One call per re-layout; every
//! pass recomputes the scene from scratch against the current offset
//! store.

mod fit;
pub mod relax;
mod types;

pub use relax::{NoRelax, RelaxStrategy, SpringRelax};
pub use types::{ChildrenMap, Edge, FittedLabel, Node, NodeId, Scene, Viewport};

use std::collections::HashMap;

use crate::color::Rgb;
use crate::config::LayoutConfig;
use crate::engine::EngineError;
use crate::offsets::{Offset, OffsetStore};
use crate::outline::Group;
use crate::theme::Theme;

use fit::{base_radius, fit_label};
use relax::Particle;

/// Fallback canvas size when the host viewport has no measurable extent.
pub(crate) const MIN_SCENE_WIDTH: f32 = 600.0;
pub(crate) const MIN_SCENE_HEIGHT: f32 = 400.0;

/// Seeded xorshift used for root palette picks, so color assignment is
/// random-looking across roots but reproducible per document session.
#[derive(Debug, Clone)]
pub(crate) struct ColorPicker {
    state: u64,
}

impl ColorPicker {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next() % len as u64) as usize
    }
}

/// Mutable engine state threaded through one layout pass.
pub(crate) struct PassState<'a> {
    pub offsets: &'a mut OffsetStore,
    pub root_colors: &'a mut HashMap<NodeId, Rgb>,
    pub children: &'a mut ChildrenMap,
    pub picker: &'a mut ColorPicker,
}

pub(crate) fn compute_scene(
    groups: &[Group],
    theme: &Theme,
    config: &LayoutConfig,
    viewport: Viewport,
    dragging: bool,
    strategy: &dyn RelaxStrategy,
    state: PassState<'_>,
) -> Result<Scene, EngineError> {
    // Parse configured colors up front so a bad palette cannot leave a
    // half-updated pass behind.
    let palette = theme.parsed_palette()?;
    let fallback = Rgb::parse(&config.fallback_root_color)?;

    let viewport_width = if viewport.width > 0.0 {
        viewport.width
    } else {
        MIN_SCENE_WIDTH
    };
    let viewport_height = if viewport.height > 0.0 {
        viewport.height
    } else {
        MIN_SCENE_HEIGHT
    };

    state.children.clear();
    if groups.is_empty() {
        return Ok(Scene::empty(viewport_width, viewport_height));
    }

    let mut nodes: Vec<Node> = Vec::new();
    let mut edge_pairs: Vec<(NodeId, NodeId)> = Vec::new();
    let mut group_offset_y = 0.0f32;

    for (group_index, group) in groups.iter().enumerate() {
        let first = nodes.len();
        for (index, item) in group.items.iter().enumerate() {
            let id = NodeId::new(group_index, index);
            let label = fit_label(&item.text, base_radius(item.level, config), theme, config);
            let base_x = config.left_margin + item.level as f32 * config.x_step;
            let base_y = config.top_margin + group_offset_y + index as f32 * config.y_step;
            let offset = state.offsets.get(id);
            nodes.push(Node {
                id,
                level: item.level,
                x: base_x + offset.dx,
                y: base_y + offset.dy,
                r: label.radius,
                base_x,
                base_y,
                lines: label.lines,
                fill: String::new(),
                stroke: String::new(),
                parent: None,
                root: id,
            });
        }

        // Nearest preceding strictly-shallower item is the parent; items
        // without one are roots and get (or keep) a palette color.
        for i in first..nodes.len() {
            let level = nodes[i].level;
            let parent = nodes[first..i]
                .iter()
                .rposition(|candidate| candidate.level < level)
                .map(|rel| rel + first);
            match parent {
                Some(j) => {
                    let parent_id = nodes[j].id;
                    let root = nodes[j].root;
                    let child_id = nodes[i].id;
                    nodes[i].parent = Some(parent_id);
                    nodes[i].root = root;
                    edge_pairs.push((parent_id, child_id));
                    state.children.entry(parent_id).or_default().push(child_id);
                }
                None => {
                    let id = nodes[i].id;
                    nodes[i].root = id;
                    let picker = &mut *state.picker;
                    state.root_colors.entry(id).or_insert_with(|| {
                        if palette.is_empty() {
                            fallback
                        } else {
                            palette[picker.pick(palette.len())]
                        }
                    });
                }
            }
        }

        for node in nodes[first..].iter_mut() {
            let base = state.root_colors.get(&node.root).copied().unwrap_or(fallback);
            let t = (node.level as f32 * config.level_lighten_step).min(config.max_lighten);
            node.fill = base.lighten(t).to_hex();
            node.stroke = base.darken(config.stroke_darken).to_hex();
        }

        group_offset_y += group.items.len() as f32 * config.y_step + config.group_gap;
    }

    let width = nodes
        .iter()
        .map(|node| node.x + node.r)
        .fold(0.0, f32::max)
        + config.right_margin;
    let width = viewport_width.max(width);
    let height = nodes
        .iter()
        .map(|node| node.y + node.r)
        .fold(0.0, f32::max)
        + config.top_margin;
    let height = viewport_height.max(height);

    if dragging {
        log::debug!("relaxation skipped: drag in progress");
    } else if strategy.is_active() {
        let mut particles: Vec<Particle> = nodes
            .iter()
            .map(|node| {
                let offset = state.offsets.get(node.id);
                Particle {
                    id: node.id,
                    x: node.x,
                    y: node.y,
                    r: node.r,
                    tx: node.base_x + offset.dx,
                    ty: node.base_y + offset.dy,
                    strength: if node.parent.is_some() {
                        config.branch_anchor_strength
                    } else {
                        config.root_anchor_strength
                    },
                }
            })
            .collect();
        strategy.relax(&mut particles, width, height, config);
        // Relaxation is pressure relief, not drift: the store is rewritten
        // as final-minus-base so repeated passes converge.
        for (particle, node) in particles.iter().zip(nodes.iter()) {
            state.offsets.set(
                node.id,
                Offset::new(particle.x - node.base_x, particle.y - node.base_y),
            );
        }
    }

    for node in nodes.iter_mut() {
        let offset = state.offsets.get(node.id);
        node.x = node.base_x + offset.dx;
        node.y = node.base_y + offset.dy;
    }

    let centers: HashMap<NodeId, (f32, f32)> = nodes
        .iter()
        .map(|node| (node.id, (node.x, node.y)))
        .collect();
    let edges = edge_pairs
        .into_iter()
        .filter_map(|(from, to)| {
            let (x1, y1) = centers.get(&from)?;
            let (x2, y2) = centers.get(&to)?;
            Some(Edge {
                from,
                to,
                x1: *x1,
                y1: *y1,
                x2: *x2,
                y2: *y2,
            })
        })
        .collect();

    Ok(Scene {
        nodes,
        edges,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::parse_outline;

    struct TestState {
        offsets: OffsetStore,
        root_colors: HashMap<NodeId, Rgb>,
        children: ChildrenMap,
        picker: ColorPicker,
    }

    impl TestState {
        fn new() -> Self {
            Self {
                offsets: OffsetStore::new(),
                root_colors: HashMap::new(),
                children: ChildrenMap::new(),
                picker: ColorPicker::new(7),
            }
        }

        fn pass(&mut self) -> PassState<'_> {
            PassState {
                offsets: &mut self.offsets,
                root_colors: &mut self.root_colors,
                children: &mut self.children,
                picker: &mut self.picker,
            }
        }
    }

    fn scene_for(text: &str, state: &mut TestState) -> Scene {
        let groups = parse_outline(text);
        compute_scene(
            &groups,
            &Theme::poppins(),
            &LayoutConfig::default(),
            Viewport::new(800.0, 600.0),
            false,
            &NoRelax,
            state.pass(),
        )
        .unwrap()
    }

    #[test]
    fn empty_document_yields_empty_scene() {
        let mut state = TestState::new();
        let scene = scene_for("", &mut state);
        assert!(scene.is_empty());
        assert_eq!(scene.width, 800.0);
        assert_eq!(scene.height, 600.0);
    }

    #[test]
    fn zero_viewport_falls_back_to_minimum_canvas() {
        let mut state = TestState::new();
        let groups = parse_outline("");
        let scene = compute_scene(
            &groups,
            &Theme::poppins(),
            &LayoutConfig::default(),
            Viewport::new(0.0, 0.0),
            false,
            &NoRelax,
            state.pass(),
        )
        .unwrap();
        assert_eq!(scene.width, MIN_SCENE_WIDTH);
        assert_eq!(scene.height, MIN_SCENE_HEIGHT);
    }

    #[test]
    fn base_grid_positions_follow_level_and_index() {
        let mut state = TestState::new();
        let scene = scene_for("A\n\tB\n\tC", &mut state);
        let config = LayoutConfig::default();
        let a = scene.node(NodeId::new(0, 0)).unwrap();
        let b = scene.node(NodeId::new(0, 1)).unwrap();
        let c = scene.node(NodeId::new(0, 2)).unwrap();
        assert_eq!(a.base_x, config.left_margin);
        assert_eq!(a.base_y, config.top_margin);
        assert_eq!(b.base_x, config.left_margin + config.x_step);
        assert_eq!(b.base_y, config.top_margin + config.y_step);
        assert_eq!(c.base_y, config.top_margin + 2.0 * config.y_step);
    }

    #[test]
    fn worked_example_links_and_groups() {
        let mut state = TestState::new();
        let scene = scene_for("A\n\tB\n\tC\n\n\nD", &mut state);
        assert_eq!(scene.nodes.len(), 4);
        assert_eq!(scene.edges.len(), 2);
        let a = NodeId::new(0, 0);
        assert_eq!(scene.edges[0].from, a);
        assert_eq!(scene.edges[0].to, NodeId::new(0, 1));
        assert_eq!(scene.edges[1].to, NodeId::new(0, 2));

        let d = scene.node(NodeId::new(1, 0)).unwrap();
        assert_eq!(d.parent, None);
        assert_eq!(d.root, NodeId::new(1, 0));
        assert_eq!(state.children.get(&a).map(Vec::len), Some(2));
    }

    #[test]
    fn multi_level_dedent_attaches_to_remaining_ancestor() {
        let mut state = TestState::new();
        let scene = scene_for("a\n\tb\n\t\tc\n\t\t\td\n\te", &mut state);
        let e = scene.node(NodeId::new(0, 4)).unwrap();
        assert_eq!(e.parent, Some(NodeId::new(0, 0)));
    }

    #[test]
    fn groups_stack_vertically_with_gap() {
        let mut state = TestState::new();
        let scene = scene_for("a\nb\n\n\nc", &mut state);
        let config = LayoutConfig::default();
        let c = scene.node(NodeId::new(1, 0)).unwrap();
        let expected = config.top_margin + 2.0 * config.y_step + config.group_gap;
        assert_eq!(c.base_y, expected);
    }

    #[test]
    fn root_fill_matches_palette_pick_and_children_shade_from_it() {
        let mut state = TestState::new();
        let scene = scene_for("root\n\tchild", &mut state);
        let root = scene.node(NodeId::new(0, 0)).unwrap();
        let child = scene.node(NodeId::new(0, 1)).unwrap();
        let base = state.root_colors[&NodeId::new(0, 0)];
        // Level 0 lightens by zero, so the fill is the base color itself.
        assert_eq!(root.fill, base.to_hex());
        assert_eq!(root.stroke, base.darken(0.2).to_hex());
        assert_eq!(child.fill, base.lighten(0.25).to_hex());
        assert_eq!(child.stroke, root.stroke);
        assert_eq!(child.root, root.id);
    }

    #[test]
    fn root_colors_are_stable_across_passes() {
        let mut state = TestState::new();
        scene_for("a\n\n\nb", &mut state);
        let first = state.root_colors.clone();
        scene_for("a\n\n\nb", &mut state);
        assert_eq!(state.root_colors, first);
    }

    #[test]
    fn offsets_are_applied_to_final_positions() {
        let mut state = TestState::new();
        state
            .offsets
            .set(NodeId::new(0, 0), Offset::new(25.0, -10.0));
        let scene = scene_for("solo", &mut state);
        let node = scene.node(NodeId::new(0, 0)).unwrap();
        assert_eq!(node.x, node.base_x + 25.0);
        assert_eq!(node.y, node.base_y - 10.0);
    }

    #[test]
    fn edges_follow_final_positions() {
        let mut state = TestState::new();
        state.offsets.set(NodeId::new(0, 1), Offset::new(40.0, 0.0));
        let scene = scene_for("a\n\tb", &mut state);
        let b = scene.node(NodeId::new(0, 1)).unwrap();
        assert_eq!(scene.edges[0].x2, b.x);
        assert_eq!(scene.edges[0].y2, b.y);
    }

    #[test]
    fn scene_grows_to_fit_content() {
        let mut state = TestState::new();
        let text: String = (0..12).map(|i| format!("item {i}\n")).collect();
        let scene = scene_for(&text, &mut state);
        assert!(scene.height > 600.0);
    }

    #[test]
    fn invalid_palette_is_an_error_not_a_panic() {
        let mut state = TestState::new();
        let mut theme = Theme::poppins();
        theme.root_palette = vec!["#nothex".to_string()];
        let groups = parse_outline("a");
        let result = compute_scene(
            &groups,
            &theme,
            &LayoutConfig::default(),
            Viewport::new(800.0, 600.0),
            false,
            &NoRelax,
            state.pass(),
        );
        assert!(result.is_err());
        assert!(state.root_colors.is_empty());
    }
}
