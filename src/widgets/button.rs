use crate::error::Result;
use crate::events::{EventKind, Listener};
use crate::tree::{ContainerProps, NodeId, Tree};

use super::font::TextAlign;
use super::{BorderStyle, Bounds, Label};

/// A push button: beveled at rest, inset while held.
///
/// There is no click event. Subscribe to [`EventKind::MouseRelease`] on
/// [`Button::id`] to react to clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    id: NodeId,
}

impl Button {
    /// Build a detached button.
    ///
    /// If the tree has a root, the button also listens for releases there
    /// so it pops back out when the pointer is released outside of it.
    pub fn new(tree: &mut Tree, text: &str, bounds: Bounds) -> Result<Self> {
        let theme = *tree.theme();
        let label = Label::new(text)
            .color(theme.text)
            .bold()
            .align(TextAlign::Center)
            .margin_left(4.0)
            .margin_top(-5.0);
        let id = tree.create(
            ContainerProps::new(bounds)
                .background(theme.window)
                .border(BorderStyle::Bevel)
                .label(label),
        );

        tree.on(
            id,
            EventKind::MousePress,
            Listener::new(move |tree, _| tree.set_border_style(id, BorderStyle::Inset)),
        )?;

        let pop_out = Listener::new(move |tree, _| {
            if tree.border_style(id) == Some(BorderStyle::Inset) {
                tree.set_border_style(id, BorderStyle::Bevel)?;
            }
            Ok(())
        });
        tree.on(id, EventKind::MouseRelease, pop_out.clone())?;
        if let Some(root) = tree.root() {
            tree.on_owned(root, EventKind::MouseRelease, id, pop_out)?;
        }

        Ok(Self { id })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_pressed(&self, tree: &Tree) -> bool {
        tree.border_style(self.id) == Some(BorderStyle::Inset)
    }
}
