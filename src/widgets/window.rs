use std::cell::Cell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::events::{EventKind, Listener};
use crate::layout::{MarginConfig, MarginLayout};
use crate::tree::{ContainerProps, NodeId, Tree};

use super::{BorderStyle, Bounds, Label};

/// Height of the title strip plus the frame above it.
pub const TITLEBAR_BOTTOM: f32 = 21.0;
/// Width of the bevel frame around content and title.
pub const FRAME: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// A beveled window with a title bar and a content area.
///
/// Pressing the title bar brings the window to the front of its parent and
/// starts a drag; every `MouseDrag` reaching the tree root then moves the
/// window by the pointer movement until the next `MouseRelease` on the
/// root. The window swallows every pointer event that reaches it, so
/// nothing underneath reacts to clicks on it.
#[derive(Debug, Clone)]
pub struct Window {
    id: NodeId,
    content: NodeId,
    titlebar: NodeId,
    drag: Rc<Cell<DragState>>,
}

impl Window {
    /// Build a detached window at `bounds`. The tree needs a root: drag
    /// tracking listens there.
    pub fn new(tree: &mut Tree, title: &str, bounds: Bounds) -> Result<Self> {
        let root = tree.root().ok_or(Error::NoRoot)?;
        let theme = *tree.theme();

        let id = tree.create(
            ContainerProps::new(bounds)
                .background(theme.window)
                .border(BorderStyle::Bevel),
        );

        let content = tree.create(ContainerProps::new(bounds).background(theme.window));
        MarginLayout::install(
            tree,
            content,
            MarginConfig::new().margins(TITLEBAR_BOTTOM, FRAME, FRAME, FRAME),
        )?;

        let titlebar = tree.create(
            ContainerProps::default()
                .background(theme.titlebar)
                .label(Label::new(title).color(theme.titlebar_text).margin_left(10.0)),
        );
        MarginLayout::install(
            tree,
            titlebar,
            MarginConfig::new()
                .margin_left(FRAME)
                .margin_top(FRAME)
                .margin_right(FRAME)
                .bottom(TITLEBAR_BOTTOM),
        )?;

        let drag = Rc::new(Cell::new(DragState::Idle));

        let state = drag.clone();
        tree.on(
            titlebar,
            EventKind::MousePress,
            Listener::new(move |tree, _| {
                if let Some(parent) = tree.parent(id) {
                    tree.remove(parent, id)?;
                    tree.add(parent, id)?;
                }
                state.set(DragState::Dragging);
                Ok(())
            }),
        )?;

        let state = drag.clone();
        tree.on_owned(
            root,
            EventKind::MouseDrag,
            id,
            Listener::new(move |tree, event| {
                if state.get() != DragState::Dragging {
                    return Ok(());
                }
                let bounds = tree.bounds(id).ok_or(Error::StaleNode(id))?;
                tree.set_bounds(id, bounds.translate(event.movement_x, event.movement_y))
            }),
        )?;

        let state = drag.clone();
        tree.on_owned(
            root,
            EventKind::MouseRelease,
            id,
            Listener::new(move |_, _| {
                state.set(DragState::Idle);
                Ok(())
            }),
        )?;

        let swallow = Listener::new(|_, event| {
            event.stop_propagation();
            Ok(())
        });
        for kind in EventKind::POINTER {
            tree.on(id, kind, swallow.clone())?;
        }

        tree.add(id, content)?;
        tree.add(id, titlebar)?;

        log::debug!("window {:?} \"{}\" at {:?}", id, title, bounds);
        Ok(Self {
            id,
            content,
            titlebar,
            drag,
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Container for the window's widgets, inside the frame and below the
    /// title bar.
    pub fn content(&self) -> NodeId {
        self.content
    }

    pub fn titlebar(&self) -> NodeId {
        self.titlebar
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.get()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.get() == DragState::Dragging
    }
}
