//! Pointer-driven offset editing: a two-state machine (idle/dragging)
//! that rigidly translates a node and its whole subtree.
//!
//! The host surface forwards pointer presses, moves, and every
//! end-of-drag signal it can observe (release, window blur, pointer
//! leaving the window). A move without the primary button still held ends
//! the drag defensively, so a missed release can never leave the machine
//! stuck in `Dragging`.

use std::collections::HashMap;

use crate::layout::{ChildrenMap, NodeId};
use crate::offsets::{Offset, OffsetStore};

/// Bit set in [`Pointer::buttons`] while the primary button is held.
pub const PRIMARY_BUTTON: u8 = 1;

/// Snapshot of the pointer as reported by the host surface, in scene
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
    pub buttons: u8,
}

impl Pointer {
    pub fn new(x: f32, y: f32, buttons: u8) -> Self {
        Self { x, y, buttons }
    }

    pub fn primary_pressed(&self) -> bool {
        self.buttons & PRIMARY_BUTTON != 0
    }
}

#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

#[derive(Debug)]
struct DragSession {
    ids: Vec<NodeId>,
    start_x: f32,
    start_y: f32,
    start_offsets: HashMap<NodeId, Offset>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Ids captured by the active drag, in selection order.
    pub fn selected(&self) -> &[NodeId] {
        self.session
            .as_ref()
            .map(|session| session.ids.as_slice())
            .unwrap_or(&[])
    }

    /// idle -> dragging on a primary-button press. Selects `id` plus the
    /// transitive closure of its descendants and captures their offsets.
    /// Returns false (and stays idle) for non-primary presses.
    pub fn begin(
        &mut self,
        id: NodeId,
        pointer: Pointer,
        children: &ChildrenMap,
        offsets: &OffsetStore,
    ) -> bool {
        if !pointer.primary_pressed() {
            return false;
        }
        let ids = collect_subtree(id, children);
        let start_offsets = ids.iter().map(|id| (*id, offsets.get(*id))).collect();
        self.session = Some(DragSession {
            ids,
            start_x: pointer.x,
            start_y: pointer.y,
            start_offsets,
        });
        true
    }

    /// Apply the pointer delta to every captured id (rigid subtree
    /// translation). Returns true when offsets changed and the caller
    /// should re-layout; ends the drag and returns false when the
    /// primary button is no longer held.
    pub fn update(&mut self, pointer: Pointer, offsets: &mut OffsetStore) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        if !pointer.primary_pressed() {
            self.end();
            return false;
        }
        let dx = pointer.x - session.start_x;
        let dy = pointer.y - session.start_y;
        for id in &session.ids {
            let start = session
                .start_offsets
                .get(id)
                .copied()
                .unwrap_or_default();
            offsets.set(*id, Offset::new(start.dx + dx, start.dy + dy));
        }
        true
    }

    /// dragging -> idle. Release, window blur, and pointer-leave all
    /// funnel here; calling it while idle is a no-op.
    pub fn end(&mut self) {
        self.session = None;
    }
}

/// Depth-first walk over the children map. Iterative stack traversal; the
/// structure is a forest, so there is no cycle risk.
fn collect_subtree(id: NodeId, children: &ChildrenMap) -> Vec<NodeId> {
    let mut ids = vec![id];
    let mut stack: Vec<NodeId> = children.get(&id).cloned().unwrap_or_default();
    while let Some(current) = stack.pop() {
        ids.push(current);
        if let Some(kids) = children.get(&current) {
            stack.extend(kids.iter().copied());
        }
    }
    ids
}
