//! Arena-based container storage: the scene graph.
//!
//! The Tree owns every container using a sparse-set architecture with
//! generational indices. Containers refer to each other only through
//! [`NodeId`]s, so the parent back-reference is plain bookkeeping in the
//! child's slot and can never keep anything alive.
//!
//! ## Key Features
//!
//! - **Generational Indices**: NodeId contains index + generation, so a
//!   stale id of a destroyed container never aliases a newer one.
//!
//! - **Ordered Children**: child order is paint order (back to front) and,
//!   reversed, hit-test order (front to back).
//!
//! - **Dirty Flags**: bounds setters mark a container; its own layout and its
//!   direct children's layout run at the start of its next draw.
//!
//! - **Event Routing**: every container routes pointer events to the
//!   topmost children under the pointer, one level per hop, until one of
//!   them stops propagation.

use bitflags::bitflags;

use crate::error::{Error, Result};
use crate::events::{Event, EventEmitter, EventKind, Listener};
use crate::layout::{BaseLayout, Layout};
use crate::renderer::{Canvas, paint_chrome};
use crate::widgets::{BorderStyle, Bounds, Color, Label, Theme};

bitflags! {
    /// What a container needs before it is next presented.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ChangeFlags: u8 {
        /// Own layout and direct children's layout must run before drawing
        const NEEDS_LAYOUT = 0b01;
        /// Visual appearance changed since the last draw
        const NEEDS_PAINT  = 0b10;
    }
}

/// Unique identifier for a container in the tree.
///
/// Uses a generational index design:
/// - `index`: Position in the sparse array (reusable after removal)
/// - `generation`: Version counter that increments when a slot is reused
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

/// Initial state of a container.
#[derive(Debug, Clone, Default)]
pub struct ContainerProps {
    pub bounds: Bounds,
    pub background: Option<Color>,
    pub border_style: BorderStyle,
    pub label: Option<Label>,
}

impl ContainerProps {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn border(mut self, style: BorderStyle) -> Self {
        self.border_style = style;
        self
    }

    pub fn label(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }
}

/// Slot in the sparse map. The generation outlives the occupant so a
/// reused slot always gets a fresh one.
struct Slot {
    dense_index: Option<usize>,
    generation: u32,
}

struct Node {
    bounds: Bounds,
    background: Option<Color>,
    border_style: BorderStyle,
    label: Option<Label>,
    flags: ChangeFlags,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// `None` only while the strategy is running
    layout: Option<Box<dyn Layout>>,
    emitter: EventEmitter,
    /// Back-pointer to sparse array index (for swap-remove fixup)
    sparse_index: u32,
}

/// The scene graph: every container, their relations, and the theme they
/// paint with.
pub struct Tree {
    /// Dense array of nodes
    dense: Vec<Node>,
    sparse: Vec<Slot>,
    /// Free list of reusable sparse indices
    free_indices: Vec<u32>,
    root: Option<NodeId>,
    theme: Theme,
    /// Nesting depth of `emit` calls currently on the stack
    dispatch_depth: usize,
    /// Detached by `dispose` during dispatch, freed when it unwinds
    disposed: Vec<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::with_theme(Theme::default())
    }

    pub fn with_theme(theme: Theme) -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            free_indices: Vec::new(),
            root: None,
            theme,
            dispatch_depth: 0,
            disposed: Vec::new(),
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Swap the palette. Widgets copy theme colors when they are built, so
    /// only containers relying on fallbacks change appearance.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        for node in &mut self.dense {
            node.flags |= ChangeFlags::NEEDS_PAINT;
        }
    }

    /// Create a detached container. It routes pointer events to its
    /// children from the start; the router runs before any listener added
    /// later.
    pub fn create(&mut self, props: ContainerProps) -> NodeId {
        let (sparse_index, generation) = if let Some(idx) = self.free_indices.pop() {
            let slot = &mut self.sparse[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            (idx, slot.generation)
        } else {
            let idx = self.sparse.len() as u32;
            self.sparse.push(Slot {
                dense_index: None,
                generation: 0,
            });
            (idx, 0)
        };
        let id = NodeId::new(sparse_index, generation);

        let router = Listener::new(move |tree, event| tree.route(id, event));
        let mut emitter = EventEmitter::new();
        for kind in EventKind::POINTER {
            emitter.on(kind, router.clone());
        }

        self.sparse[sparse_index as usize].dense_index = Some(self.dense.len());
        self.dense.push(Node {
            bounds: props.bounds,
            background: props.background,
            border_style: props.border_style,
            label: props.label,
            flags: ChangeFlags::NEEDS_PAINT,
            parent: None,
            children: Vec::new(),
            layout: Some(Box::new(BaseLayout)),
            emitter,
            sparse_index,
        });

        log::trace!("created container {:?} at {:?}", id, props.bounds);
        id
    }

    /// Destroy a container and its whole subtree.
    ///
    /// The container is detached from its parent first. Listeners that any
    /// destroyed container owns (see [`Tree::on_owned`]) are unregistered
    /// wherever they were attached.
    pub fn destroy(&mut self, id: NodeId) -> Result<()> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.detach(parent, id);
        }

        let doomed = self.subtree(id);
        for &node in &doomed {
            self.unregister(node);
        }
        for node in &mut self.dense {
            node.emitter.purge_owned(&doomed);
        }
        if self.root.is_some_and(|root| doomed.contains(&root)) {
            self.root = None;
        }

        log::debug!("destroyed {:?} ({} containers)", id, doomed.len());
        Ok(())
    }

    /// Detach `id` now and destroy it once the outermost [`Tree::emit`]
    /// returns.
    ///
    /// Use this from a listener that dismisses the container it is attached
    /// to: the remaining listeners of the ongoing dispatch (such as a
    /// window's propagation stopper) still see a live container. Outside of
    /// a dispatch this is [`Tree::destroy`].
    pub fn dispose(&mut self, id: NodeId) -> Result<()> {
        if self.dispatch_depth == 0 {
            return self.destroy(id);
        }
        if let Some(parent) = self.node(id)?.parent {
            self.detach(parent, id);
        }
        self.disposed.push(id);
        Ok(())
    }

    fn flush_disposed(&mut self) {
        for id in std::mem::take(&mut self.disposed) {
            if !self.is_alive(id) {
                continue;
            }
            if self.parent(id).is_some() {
                log::debug!("{:?} was re-attached after dispose, keeping it", id);
                continue;
            }
            if let Err(err) = self.destroy(id) {
                log::warn!("failed to destroy disposed container: {}", err);
            }
        }
    }

    /// Swap-remove a single node from the dense storage.
    fn unregister(&mut self, id: NodeId) {
        let Some(dense_index) = self.dense_index(id) else {
            return;
        };
        let last_dense_index = self.dense.len() - 1;
        self.dense.swap_remove(dense_index);

        // Fix up the moved node's sparse entry (if we didn't remove the last element)
        if dense_index != last_dense_index {
            let moved_sparse_idx = self.dense[dense_index].sparse_index;
            self.sparse[moved_sparse_idx as usize].dense_index = Some(dense_index);
        }

        self.sparse[id.index as usize].dense_index = None;
        self.free_indices.push(id.index);
    }

    /// `id` followed by all of its descendants, depth first.
    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.get(current) {
                out.push(current);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn dense_index(&self, id: NodeId) -> Option<usize> {
        self.sparse
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.dense_index)
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.dense_index(id).map(|idx| &self.dense[idx])
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.dense_index(id).map(|idx| &mut self.dense[idx])
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or(Error::StaleNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.get_mut(id).ok_or(Error::StaleNode(id))
    }

    /// Whether `id` refers to a live container.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.dense_index(id).is_some()
    }

    /// Number of live containers, attached or not.
    pub fn node_count(&self) -> usize {
        self.dense.len()
    }

    pub fn set_root(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        self.root = Some(id);
        Ok(())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Append `child` to `parent` (on top of its siblings) and lay it out
    /// immediately.
    ///
    /// A child attached elsewhere is moved; re-adding an existing child
    /// brings it to the front.
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(Error::WouldCycle { parent, child });
        }

        if let Some(old_parent) = self.node(child)?.parent {
            self.detach(old_parent, child);
        }
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);

        log::debug!("added {:?} to {:?}", child, parent);
        if self.is_dirty(child) {
            self.relayout(child)
        } else {
            self.layout(child)
        }
    }

    /// Detach `child` from `parent`. Not a child of `parent`: no-op.
    ///
    /// The child keeps its last computed bounds and is not laid out again
    /// until it is attached somewhere.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        if self.detach(parent, child) {
            log::debug!("removed {:?} from {:?}", child, parent);
        }
        Ok(())
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(node) = self.get_mut(parent) else {
            return false;
        };
        let Some(pos) = node.children.iter().position(|&c| c == child) else {
            return false;
        };
        node.children.remove(pos);
        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = None;
        }
        true
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == candidate {
                return true;
            }
            match self.get(id).and_then(|n| n.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Children in paint order (back to front).
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).map(|n| n.children.clone()).unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Bounds and style
    // ------------------------------------------------------------------

    pub fn bounds(&self, id: NodeId) -> Option<Bounds> {
        self.get(id).map(|n| n.bounds)
    }

    pub fn width(&self, id: NodeId) -> Option<f32> {
        self.bounds(id).map(|b| b.width())
    }

    pub fn height(&self, id: NodeId) -> Option<f32> {
        self.bounds(id).map(|b| b.height())
    }

    pub fn left(&self, id: NodeId) -> Option<f32> {
        self.bounds(id).map(|b| b.left)
    }

    pub fn top(&self, id: NodeId) -> Option<f32> {
        self.bounds(id).map(|b| b.top)
    }

    pub fn right(&self, id: NodeId) -> Option<f32> {
        self.bounds(id).map(|b| b.right)
    }

    pub fn bottom(&self, id: NodeId) -> Option<f32> {
        self.bounds(id).map(|b| b.bottom)
    }

    /// Closed hit test in the parent's frame; false for stale ids.
    pub fn contains(&self, id: NodeId, x: f32, y: f32) -> bool {
        self.get(id).is_some_and(|n| n.bounds.contains(x, y))
    }

    fn update_bounds(&mut self, id: NodeId, f: impl FnOnce(&mut Bounds)) -> Result<()> {
        let node = self.node_mut(id)?;
        f(&mut node.bounds);
        node.flags |= ChangeFlags::NEEDS_LAYOUT | ChangeFlags::NEEDS_PAINT;
        Ok(())
    }

    pub fn set_left(&mut self, id: NodeId, v: f32) -> Result<()> {
        self.update_bounds(id, |b| b.left = v)
    }

    pub fn set_top(&mut self, id: NodeId, v: f32) -> Result<()> {
        self.update_bounds(id, |b| b.top = v)
    }

    pub fn set_right(&mut self, id: NodeId, v: f32) -> Result<()> {
        self.update_bounds(id, |b| b.right = v)
    }

    pub fn set_bottom(&mut self, id: NodeId, v: f32) -> Result<()> {
        self.update_bounds(id, |b| b.bottom = v)
    }

    pub fn set_bounds(&mut self, id: NodeId, bounds: Bounds) -> Result<()> {
        self.update_bounds(id, |b| *b = bounds)
    }

    /// Write bounds computed by a layout strategy.
    ///
    /// Unlike the setters this leaves the container's own dirty flag alone
    /// (its layout is running right now). If the bounds actually change,
    /// the direct children are marked so they follow on the next draw.
    /// Returns whether anything changed.
    pub fn apply_layout_bounds(&mut self, id: NodeId, bounds: Bounds) -> Result<bool> {
        let node = self.node_mut(id)?;
        if node.bounds == bounds {
            return Ok(false);
        }
        node.bounds = bounds;
        node.flags |= ChangeFlags::NEEDS_PAINT;
        for child in node.children.clone() {
            self.mark_needs_layout(child);
        }
        Ok(true)
    }

    pub fn border_style(&self, id: NodeId) -> Option<BorderStyle> {
        self.get(id).map(|n| n.border_style)
    }

    pub fn set_border_style(&mut self, id: NodeId, style: BorderStyle) -> Result<()> {
        let node = self.node_mut(id)?;
        node.border_style = style;
        node.flags |= ChangeFlags::NEEDS_PAINT;
        Ok(())
    }

    pub fn background(&self, id: NodeId) -> Option<Color> {
        self.get(id).and_then(|n| n.background)
    }

    pub fn set_background(&mut self, id: NodeId, color: Option<Color>) -> Result<()> {
        let node = self.node_mut(id)?;
        node.background = color;
        node.flags |= ChangeFlags::NEEDS_PAINT;
        Ok(())
    }

    pub fn label(&self, id: NodeId) -> Option<&Label> {
        self.get(id).and_then(|n| n.label.as_ref())
    }

    pub fn set_label(&mut self, id: NodeId, label: Option<Label>) -> Result<()> {
        let node = self.node_mut(id)?;
        node.label = label;
        node.flags |= ChangeFlags::NEEDS_PAINT;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Whether the container must run its layout before the next draw.
    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| n.flags.contains(ChangeFlags::NEEDS_LAYOUT))
    }

    pub fn flags(&self, id: NodeId) -> ChangeFlags {
        self.get(id).map(|n| n.flags).unwrap_or(ChangeFlags::empty())
    }

    pub fn mark_needs_layout(&mut self, id: NodeId) {
        if let Some(node) = self.get_mut(id) {
            node.flags |= ChangeFlags::NEEDS_LAYOUT;
        }
    }

    pub fn clear_dirty(&mut self, id: NodeId) {
        if let Some(node) = self.get_mut(id) {
            node.flags.remove(ChangeFlags::NEEDS_LAYOUT);
        }
    }

    /// Whether any live container has pending layout or paint work.
    pub fn needs_redraw(&self) -> bool {
        self.dense.iter().any(|n| !n.flags.is_empty())
    }

    /// Replace the layout strategy of `id`.
    pub fn set_layout(&mut self, id: NodeId, layout: Box<dyn Layout>) -> Result<()> {
        self.node_mut(id)?.layout = Some(layout);
        Ok(())
    }

    /// Replace the layout strategy of `id` with one built around the
    /// current strategy.
    pub fn wrap_layout(
        &mut self,
        id: NodeId,
        f: impl FnOnce(Box<dyn Layout>) -> Box<dyn Layout>,
    ) -> Result<()> {
        let node = self.node_mut(id)?;
        let current = node
            .layout
            .take()
            .unwrap_or_else(|| Box::new(BaseLayout));
        node.layout = Some(f(current));
        Ok(())
    }

    /// Lay out `id` and then its direct children, which a dirty container
    /// owes before it is drawn.
    fn relayout(&mut self, id: NodeId) -> Result<()> {
        self.layout(id)?;
        for child in self.children(id) {
            self.layout(child)?;
        }
        Ok(())
    }

    /// Run the layout strategy of `id`.
    ///
    /// The strategy is taken out of the node while it runs so it can
    /// mutate the tree; a nested layout of the same container falls back
    /// to [`BaseLayout`].
    pub fn layout(&mut self, id: NodeId) -> Result<()> {
        let Some(mut strategy) = self.node_mut(id)?.layout.take() else {
            return BaseLayout.layout(self, id);
        };

        let result = strategy.layout(self, id);

        // Keep a strategy installed while ours was running
        if let Some(node) = self.get_mut(id) {
            if node.layout.is_none() {
                node.layout = Some(strategy);
            }
        }
        result
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Draw `id` and its subtree.
    ///
    /// A dirty container first runs its own layout and the layout of each
    /// direct child. Chrome, children and label are then painted in a frame
    /// translated to the container's top-left corner.
    pub fn draw(&mut self, id: NodeId, canvas: &mut dyn Canvas) -> Result<()> {
        if self.is_dirty(id) {
            self.relayout(id)?;
        }

        let node = self.node(id)?;
        let bounds = node.bounds;
        let background = node.background.unwrap_or(self.theme.window);
        let style = node.border_style;
        let children = node.children.clone();

        canvas.save();
        canvas.translate(bounds.left, bounds.top);
        paint_chrome(canvas, style, background, bounds.width(), bounds.height());

        for child in children {
            if let Err(err) = self.draw(child, canvas) {
                canvas.restore();
                return Err(err);
            }
        }

        if let Some(label) = self.get(id).and_then(|n| n.label.as_ref()) {
            label.paint(canvas, &self.theme, bounds.width(), bounds.height());
        }
        canvas.restore();

        if let Some(node) = self.get_mut(id) {
            node.flags.remove(ChangeFlags::NEEDS_PAINT);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Register `listener` on `id`. Returns false if it was already there.
    pub fn on(&mut self, id: NodeId, kind: EventKind, listener: Listener) -> Result<bool> {
        Ok(self.node_mut(id)?.emitter.on(kind, listener))
    }

    /// Register `listener` on `id` for as long as `owner` lives.
    pub fn on_owned(
        &mut self,
        id: NodeId,
        kind: EventKind,
        owner: NodeId,
        listener: Listener,
    ) -> Result<bool> {
        self.node(owner)?;
        Ok(self.node_mut(id)?.emitter.on_owned(kind, owner, listener))
    }

    pub fn off(&mut self, id: NodeId, kind: &EventKind, listener: &Listener) -> Result<bool> {
        Ok(self.node_mut(id)?.emitter.off(kind, listener))
    }

    pub fn listener_count(&self, id: NodeId, kind: &EventKind) -> usize {
        self.get(id)
            .map(|n| n.emitter.listener_count(kind))
            .unwrap_or(0)
    }

    /// Synchronously invoke every listener of `id` registered for the
    /// event's kind.
    ///
    /// Listeners unregistered by an earlier listener of the same fan-out
    /// (including by destroying `id`) are skipped. The first error aborts
    /// the fan-out and is returned.
    pub fn emit(&mut self, id: NodeId, event: &Event) -> Result<()> {
        let listeners = self.node(id)?.emitter.snapshot(&event.kind);

        self.dispatch_depth += 1;
        let result = self.fan_out(id, event, listeners);
        self.dispatch_depth -= 1;

        if self.dispatch_depth == 0 && !self.disposed.is_empty() {
            self.flush_disposed();
        }
        result
    }

    fn fan_out(&mut self, id: NodeId, event: &Event, listeners: Vec<Listener>) -> Result<()> {
        for listener in listeners {
            let registered = self
                .get(id)
                .is_some_and(|n| n.emitter.is_registered(&event.kind, &listener));
            if registered {
                listener.call(self, event)?;
            }
        }
        Ok(())
    }

    /// Offer `event` to the children of `id` under the pointer, topmost
    /// first, until one of them stops propagation.
    fn route(&mut self, id: NodeId, event: &Event) -> Result<()> {
        let Some(node) = self.get(id) else {
            return Ok(());
        };
        let local_x = event.x - node.bounds.left;
        let local_y = event.y - node.bounds.top;
        let candidates: Vec<NodeId> = node
            .children
            .iter()
            .rev()
            .copied()
            .filter(|&child| self.contains(child, local_x, local_y))
            .collect();

        for child in candidates {
            // A listener earlier in this pass may have moved or destroyed it
            if self.parent(child) != Some(id) {
                continue;
            }
            let forwarded = event.forwarded(local_x, local_y);
            self.emit(child, &forwarded)?;
            if forwarded.is_propagation_stopped() {
                log::trace!("{:?} stopped {:?} inside {:?}", child, event.kind, id);
                break;
            }
        }
        Ok(())
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
