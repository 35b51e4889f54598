use crate::error::{Error, Result};
use crate::layout::{MarginConfig, MarginLayout};
use crate::tree::{ContainerProps, NodeId, Tree};

use super::{BorderStyle, Bounds, Button};

pub const TASKBAR_HEIGHT: f32 = 29.0;

/// Beveled strip along the bottom edge of the root with a "Start" button.
#[derive(Debug, Clone, Copy)]
pub struct Taskbar {
    id: NodeId,
    start: Button,
}

impl Taskbar {
    /// Build a detached taskbar sized for the current root.
    pub fn new(tree: &mut Tree) -> Result<Self> {
        let root = tree.root().ok_or(Error::NoRoot)?;
        let area = tree.bounds(root).ok_or(Error::StaleNode(root))?;
        let theme = *tree.theme();

        let id = tree.create(
            ContainerProps::new(Bounds::new(0.0, 0.0, area.width(), TASKBAR_HEIGHT))
                .background(theme.window)
                .border(BorderStyle::Bevel),
        );
        MarginLayout::install(
            tree,
            id,
            MarginConfig::new().top(area.height() - TASKBAR_HEIGHT),
        )?;

        let start = Button::new(
            tree,
            "Start",
            Bounds::new(3.0, 3.0, 64.0, 3.0 + TASKBAR_HEIGHT - 6.0),
        )?;
        tree.add(id, start.id())?;

        Ok(Self { id, start })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn start(&self) -> Button {
        self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taskbar_spans_bottom_edge() {
        let mut tree = Tree::new();
        let root = tree.create(ContainerProps::new(Bounds::new(0.0, 0.0, 800.0, 600.0)));
        tree.set_root(root).unwrap();

        let taskbar = Taskbar::new(&mut tree).unwrap();
        tree.add(root, taskbar.id()).unwrap();

        assert_eq!(tree.bounds(taskbar.id()), Some(Bounds::new(0.0, 571.0, 800.0, 600.0)));
        assert_eq!(
            tree.bounds(taskbar.start().id()),
            Some(Bounds::new(3.0, 3.0, 64.0, 26.0))
        );
        assert_eq!(tree.label(taskbar.start().id()).map(|l| l.text.as_str()), Some("Start"));
    }

    #[test]
    fn test_taskbar_follows_root_width() {
        let mut tree = Tree::new();
        let root = tree.create(ContainerProps::new(Bounds::new(0.0, 0.0, 800.0, 600.0)));
        tree.set_root(root).unwrap();
        let taskbar = Taskbar::new(&mut tree).unwrap();
        tree.add(root, taskbar.id()).unwrap();

        tree.set_right(root, 1024.0).unwrap();
        let mut ctx = crate::renderer::PaintContext::new();
        tree.draw(root, &mut ctx).unwrap();
        assert_eq!(tree.width(taskbar.id()), Some(1024.0));
    }
}
