pub mod margin;

pub use margin::{MarginConfig, MarginLayout};

use crate::error::Result;
use crate::tree::{NodeId, Tree};

/// Strategy that recomputes a container's bounds.
///
/// Each container owns exactly one strategy. Strategies compose by
/// decoration: a new strategy takes ownership of the one it replaces and
/// decides when to run it (see [`MarginLayout`]).
pub trait Layout {
    /// Recompute the bounds of `id`. Implementations must eventually run a
    /// [`BaseLayout`] (directly or through the wrapped strategy) so the
    /// container's dirty flag gets cleared.
    fn layout(&mut self, tree: &mut Tree, id: NodeId) -> Result<()>;
}

/// The layout every container starts with: leaves bounds alone and only
/// clears the dirty flag.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseLayout;

impl Layout for BaseLayout {
    fn layout(&mut self, tree: &mut Tree, id: NodeId) -> Result<()> {
        tree.clear_dirty(id);
        Ok(())
    }
}
