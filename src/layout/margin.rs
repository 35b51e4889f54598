//! Edges pinned relative to the parent's extent.

use super::Layout;
use crate::error::{Error, Result};
use crate::tree::{NodeId, Tree};
use crate::widgets::Bounds;

/// Absolute edges and margins for a [`MarginLayout`].
///
/// An absent `left`/`top` means 0; an absent `right`/`bottom` means the
/// parent's width/height. Margins are then added to `left`/`top` and
/// subtracted from `right`/`bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MarginConfig {
    pub left: Option<f32>,
    pub top: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
    pub margin_left: f32,
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
}

impl MarginConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same margin on all four sides, edges following the parent.
    pub fn uniform(margin: f32) -> Self {
        Self::new().margins(margin, margin, margin, margin)
    }

    /// Margins in CSS order: top, right, bottom, left.
    pub fn margins(mut self, top: f32, right: f32, bottom: f32, left: f32) -> Self {
        self.margin_top = top;
        self.margin_right = right;
        self.margin_bottom = bottom;
        self.margin_left = left;
        self
    }

    pub fn left(mut self, v: f32) -> Self {
        self.left = Some(v);
        self
    }

    pub fn top(mut self, v: f32) -> Self {
        self.top = Some(v);
        self
    }

    pub fn right(mut self, v: f32) -> Self {
        self.right = Some(v);
        self
    }

    pub fn bottom(mut self, v: f32) -> Self {
        self.bottom = Some(v);
        self
    }

    pub fn margin_left(mut self, v: f32) -> Self {
        self.margin_left = v;
        self
    }

    pub fn margin_top(mut self, v: f32) -> Self {
        self.margin_top = v;
        self
    }

    pub fn margin_right(mut self, v: f32) -> Self {
        self.margin_right = v;
        self
    }

    pub fn margin_bottom(mut self, v: f32) -> Self {
        self.margin_bottom = v;
        self
    }

    /// Resolve against a parent of the given size.
    pub fn resolve(&self, parent_width: f32, parent_height: f32) -> Bounds {
        Bounds {
            left: self.left.unwrap_or(0.0) + self.margin_left,
            top: self.top.unwrap_or(0.0) + self.margin_top,
            right: self.right.unwrap_or(parent_width) - self.margin_right,
            bottom: self.bottom.unwrap_or(parent_height) - self.margin_bottom,
        }
    }
}

/// Decorator that runs the strategy it replaced, then pins the edges
/// according to a [`MarginConfig`].
pub struct MarginLayout {
    inner: Box<dyn Layout>,
    config: MarginConfig,
}

impl MarginLayout {
    pub fn new(inner: Box<dyn Layout>, config: MarginConfig) -> Self {
        Self { inner, config }
    }

    /// Wrap the current strategy of `id`. Does not run it; attaching the
    /// container with [`Tree::add`] does.
    pub fn install(tree: &mut Tree, id: NodeId, config: MarginConfig) -> Result<()> {
        tree.wrap_layout(id, |inner| Box::new(MarginLayout::new(inner, config)))
    }
}

impl Layout for MarginLayout {
    fn layout(&mut self, tree: &mut Tree, id: NodeId) -> Result<()> {
        self.inner.layout(tree, id)?;

        let parent = tree.parent(id).ok_or(Error::NoParent(id))?;
        let parent_bounds = tree.bounds(parent).ok_or(Error::StaleNode(parent))?;
        let next = self
            .config
            .resolve(parent_bounds.width(), parent_bounds.height());

        if tree.apply_layout_bounds(id, next)? {
            log::trace!("margin layout moved {:?} to {:?}", id, next);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ContainerProps;

    fn parent_with_child(config: MarginConfig) -> (Tree, NodeId, NodeId) {
        let mut tree = Tree::new();
        let parent = tree.create(ContainerProps::new(Bounds::new(50.0, 50.0, 250.0, 150.0)));
        let child = tree.create(ContainerProps::new(Bounds::default()));
        MarginLayout::install(&mut tree, child, config).unwrap();
        tree.add(parent, child).unwrap();
        (tree, parent, child)
    }

    #[test]
    fn test_resolve_defaults_to_parent_extent() {
        let config = MarginConfig::new();
        assert_eq!(config.resolve(200.0, 100.0), Bounds::new(0.0, 0.0, 200.0, 100.0));
    }

    #[test]
    fn test_horizontal_margins_shrink_width() {
        let (tree, _, child) =
            parent_with_child(MarginConfig::new().margin_left(3.0).margin_right(3.0));
        let bounds = tree.bounds(child).unwrap();
        assert_eq!(bounds.width(), 200.0 - 6.0);
        assert_eq!(bounds.left, 3.0);
        assert_eq!(bounds.height(), 100.0);
    }

    #[test]
    fn test_absolute_edges_override_parent_extent() {
        // The title bar layout of a window: inset 3px, fixed bottom edge
        let config = MarginConfig::new()
            .margin_left(3.0)
            .margin_top(3.0)
            .margin_right(3.0)
            .bottom(21.0);
        let (tree, _, child) = parent_with_child(config);
        assert_eq!(tree.bounds(child), Some(Bounds::new(3.0, 3.0, 197.0, 21.0)));
    }

    #[test]
    fn test_explicit_zero_is_respected() {
        let config = MarginConfig::new().right(0.0).bottom(0.0);
        assert_eq!(config.resolve(200.0, 100.0), Bounds::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_layout_without_parent_is_an_error() {
        let mut tree = Tree::new();
        let orphan = tree.create(ContainerProps::new(Bounds::default()));
        MarginLayout::install(&mut tree, orphan, MarginConfig::uniform(2.0)).unwrap();

        match tree.layout(orphan) {
            Err(Error::NoParent(id)) => assert_eq!(id, orphan),
            other => panic!("expected NoParent, got {other:?}"),
        }
    }

    #[test]
    fn test_follows_parent_resize_on_next_draw() {
        let (mut tree, parent, child) = parent_with_child(MarginConfig::uniform(3.0));
        tree.set_right(parent, 350.0).unwrap();

        let mut ctx = crate::renderer::PaintContext::new();
        tree.draw(parent, &mut ctx).unwrap();
        assert_eq!(tree.bounds(child).unwrap().width(), 300.0 - 6.0);
    }

    #[test]
    fn test_chained_margin_layouts_run_inner_first() {
        let (mut tree, _, child) = parent_with_child(MarginConfig::uniform(3.0));
        // A second decorator wins because it runs after the first one
        MarginLayout::install(&mut tree, child, MarginConfig::uniform(10.0)).unwrap();
        tree.layout(child).unwrap();
        assert_eq!(tree.bounds(child), Some(Bounds::new(10.0, 10.0, 190.0, 90.0)));
    }
}
