use std::cell::RefCell;
use std::fmt;

use crate::error::{Error, Result};
use crate::events::{EventKind, Listener};
use crate::layout::{MarginConfig, MarginLayout};
use crate::tree::{ContainerProps, NodeId, Tree};

use super::font::TextAlign;
use super::{Bounds, Button, Label, Window};

pub const DEFAULT_DIALOG_WIDTH: f32 = 256.0;
pub const DEFAULT_DIALOG_HEIGHT: f32 = 128.0;

const OKAY_WIDTH: f32 = 64.0;
const OKAY_HEIGHT: f32 = 23.0;

/// Runs when the dialog is acknowledged. An `Err` keeps the dialog open
/// and the callback runs again on the next acknowledgement.
pub type DismissCallback = Box<dyn FnMut(&mut Tree) -> Result<()>>;

/// Description of a message dialog.
pub struct DialogProps {
    pub title: String,
    pub text: String,
    /// Centered on the root when absent
    pub bounds: Option<Bounds>,
    pub on_dismiss: Option<DismissCallback>,
}

impl DialogProps {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            bounds: None,
            on_dismiss: None,
        }
    }

    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Place a default-sized dialog with its top-left corner at `(left, top)`.
    pub fn at(self, left: f32, top: f32) -> Self {
        self.bounds(Bounds::from_origin_size(
            left,
            top,
            DEFAULT_DIALOG_WIDTH,
            DEFAULT_DIALOG_HEIGHT,
        ))
    }

    pub fn on_dismiss(mut self, f: impl FnMut(&mut Tree) -> Result<()> + 'static) -> Self {
        self.on_dismiss = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for DialogProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogProps")
            .field("title", &self.title)
            .field("text", &self.text)
            .field("bounds", &self.bounds)
            .field("on_dismiss", &self.on_dismiss.is_some())
            .finish()
    }
}

/// A window showing a centered message and an "Okay" button.
///
/// Releasing the pointer on "Okay" runs the dismiss callback, then detaches
/// and destroys the whole dialog.
#[derive(Debug, Clone)]
pub struct Dialog {
    window: Window,
    message: NodeId,
    okay: Button,
}

impl Dialog {
    /// Build a detached dialog.
    pub fn new(tree: &mut Tree, props: DialogProps) -> Result<Self> {
        let root = tree.root().ok_or(Error::NoRoot)?;
        let bounds = match props.bounds {
            Some(bounds) => bounds,
            None => {
                let area = tree.bounds(root).ok_or(Error::StaleNode(root))?;
                Bounds::from_origin_size(
                    area.width() / 2.0 - DEFAULT_DIALOG_WIDTH / 2.0,
                    area.height() / 2.0 - DEFAULT_DIALOG_HEIGHT / 2.0,
                    DEFAULT_DIALOG_WIDTH,
                    DEFAULT_DIALOG_HEIGHT,
                )
            }
        };

        let window = Window::new(tree, &props.title, bounds)?;
        let content = window.content();
        let area = tree.bounds(content).ok_or(Error::StaleNode(content))?;

        let message = tree.create(
            ContainerProps::new(Bounds::new(3.0, 3.0, 64.0, 26.0))
                .label(Label::new(props.text).align(TextAlign::Center)),
        );
        MarginLayout::install(tree, message, MarginConfig::new().margins(3.0, 3.0, 64.0, 3.0))?;

        let center = area.width() / 2.0;
        let okay = Button::new(
            tree,
            "Okay",
            Bounds::new(
                center - OKAY_WIDTH / 2.0,
                area.height() - OKAY_HEIGHT - 3.0,
                center + OKAY_WIDTH / 2.0,
                area.height() - 3.0,
            ),
        )?;

        let dialog = window.id();
        let callback = RefCell::new(props.on_dismiss);
        tree.on(
            okay.id(),
            EventKind::MouseRelease,
            Listener::new(move |tree, _| {
                let on_dismiss = callback.borrow_mut().take();
                if let Some(mut on_dismiss) = on_dismiss {
                    if let Err(err) = on_dismiss(tree) {
                        *callback.borrow_mut() = Some(on_dismiss);
                        return Err(err);
                    }
                }
                log::debug!("dialog {:?} dismissed", dialog);
                tree.dispose(dialog)
            }),
        )?;

        tree.add(content, message)?;
        tree.add(content, okay.id())?;

        Ok(Self {
            window,
            message,
            okay,
        })
    }

    /// Build a dialog and put it on top of the root.
    pub fn open(tree: &mut Tree, props: DialogProps) -> Result<Self> {
        let root = tree.root().ok_or(Error::NoRoot)?;
        let dialog = Self::new(tree, props)?;
        tree.add(root, dialog.id())?;
        Ok(dialog)
    }

    pub fn id(&self) -> NodeId {
        self.window.id()
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn message(&self) -> NodeId {
        self.message
    }

    pub fn okay(&self) -> Button {
        self.okay
    }
}
