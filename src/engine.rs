//! The layout engine: owns the offset store, root color map, and
//! children index, and re-derives the scene from the full document text
//! on every call. Collaborators (text editor, resize handler, drag
//! surface) all funnel through [`LayoutEngine::relayout`].

use std::collections::HashMap;

use thiserror::Error;

use crate::color::{ColorError, Rgb};
use crate::config::LayoutConfig;
use crate::drag::{DragController, Pointer};
use crate::layout::{
    self, ChildrenMap, ColorPicker, NoRelax, NodeId, PassState, RelaxStrategy, Scene, SpringRelax,
    Viewport,
};
use crate::offsets::OffsetStore;
use crate::outline;
use crate::theme::Theme;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configured color: {0}")]
    Color(#[from] ColorError),
}

pub struct LayoutEngine {
    theme: Theme,
    config: LayoutConfig,
    strategy: Box<dyn RelaxStrategy>,
    offsets: OffsetStore,
    root_colors: HashMap<NodeId, Rgb>,
    children: ChildrenMap,
    picker: ColorPicker,
    drag: DragController,
}

impl LayoutEngine {
    /// The relaxation strategy is picked here, once: spring/collision
    /// when the capability is available, a no-op otherwise.
    pub fn new(theme: Theme, config: LayoutConfig) -> Self {
        let strategy: Box<dyn RelaxStrategy> = if config.relaxation {
            Box::new(SpringRelax)
        } else {
            Box::new(NoRelax)
        };
        let picker = ColorPicker::new(config.color_seed);
        Self {
            theme,
            config,
            strategy,
            offsets: OffsetStore::new(),
            root_colors: HashMap::new(),
            children: ChildrenMap::new(),
            picker,
            drag: DragController::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(Theme::default(), LayoutConfig::default())
    }

    /// Rebuild the scene from the current text, offsets, and colors.
    /// Deterministic for a given engine state; an `Err` leaves the
    /// engine state exactly as it was so the next edit can recover.
    pub fn relayout(&mut self, text: &str, viewport: Viewport) -> Result<Scene, EngineError> {
        let groups = outline::parse_outline(text);
        log::debug!(
            "relayout: {} groups, {} stored offsets",
            groups.len(),
            self.offsets.len()
        );
        layout::compute_scene(
            &groups,
            &self.theme,
            &self.config,
            viewport,
            self.drag.is_active(),
            self.strategy.as_ref(),
            PassState {
                offsets: &mut self.offsets,
                root_colors: &mut self.root_colors,
                children: &mut self.children,
                picker: &mut self.picker,
            },
        )
    }

    /// Explicit "reset document": drops offsets, colors, and any live
    /// drag. The only way engine state is ever cleared.
    pub fn reset(&mut self) {
        self.offsets.clear();
        self.root_colors.clear();
        self.children.clear();
        self.picker = ColorPicker::new(self.config.color_seed);
        self.drag.end();
    }

    /// Forwarded from the interaction surface on a node press.
    pub fn begin_drag(&mut self, id: NodeId, pointer: Pointer) -> bool {
        self.drag.begin(id, pointer, &self.children, &self.offsets)
    }

    /// Forwarded on pointer move; returns true when the caller should
    /// re-layout for immediate feedback.
    pub fn drag_to(&mut self, pointer: Pointer) -> bool {
        self.drag.update(pointer, &mut self.offsets)
    }

    /// Release, window blur, and pointer-leave all end the drag.
    pub fn end_drag(&mut self) {
        self.drag.end();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    pub fn offsets(&self) -> &OffsetStore {
        &self.offsets
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }
}
