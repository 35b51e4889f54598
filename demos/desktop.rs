use std::cell::Cell;
use std::rc::Rc;

use bevel::prelude::*;

/// Frames after which the scripted pointer clicks "Okay".
const CLICK_FRAME: u64 = 30;
const LAST_FRAME: u64 = 600;

fn main() -> Result<()> {
    let mut app = App::new()
        .width(800)
        .height(600)
        .audio(VoicePool::new(Box::new(LogSink), 4));

    let root = app.root();
    let taskbar = Taskbar::new(app.tree_mut())?;
    app.tree_mut().add(root, taskbar.id())?;

    let welcome_done = Rc::new(Cell::new(false));
    let flag = welcome_done.clone();
    let welcome = Dialog::open(
        app.tree_mut(),
        DialogProps::new("Welcome", "Press Okay to begin.").on_dismiss(move |_| {
            flag.set(true);
            Ok(())
        }),
    )?;

    // Aim at the middle of the Okay button in canvas coordinates
    let tree = app.tree();
    let okay = welcome.okay().id();
    let (dialog, content, button) = (
        tree.bounds(welcome.id()).unwrap_or_default(),
        tree.bounds(welcome.window().content()).unwrap_or_default(),
        tree.bounds(okay).unwrap_or_default(),
    );
    let target_x = dialog.left + content.left + (button.left + button.right) / 2.0;
    let target_y = dialog.top + content.top + (button.top + button.bottom) / 2.0;

    let mut frame = 0u64;
    let mut barrage: Option<DecoyBarrage> = None;

    app.run(move |app, paint| {
        frame += 1;

        let input = match frame {
            CLICK_FRAME => Some(PointerInput::new(PointerKind::Press, target_x, target_y)),
            f if f == CLICK_FRAME + 1 => {
                Some(PointerInput::new(PointerKind::Release, target_x, target_y))
            }
            _ => None,
        };
        if let Some(input) = input {
            if let Err(err) = app.handle_input(input) {
                log::warn!("input failed: {}", err);
            }
        }

        if welcome_done.get() && barrage.is_none() {
            barrage = Some(app.start_barrage());
        }

        if frame % 60 == 0 {
            log::info!(
                "frame {}: {} draw commands, {} containers, {:?}",
                frame,
                paint.commands().len(),
                app.tree().node_count(),
                barrage
            );
        }

        frame < LAST_FRAME
    })
}
