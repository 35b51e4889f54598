pub mod button;
pub mod dialog;
pub mod font;
pub mod taskbar;
pub mod text;
pub mod theme;
pub mod widget;
pub mod window;

pub use button::Button;
pub use dialog::{Dialog, DialogProps, DismissCallback};
pub use font::{TextAlign, TextBaseline, TextStyle};
pub use taskbar::{TASKBAR_HEIGHT, Taskbar};
pub use text::Label;
pub use theme::Theme;
pub use widget::{BorderStyle, Bounds, Color, Rect};
pub use window::{DragState, Window};
