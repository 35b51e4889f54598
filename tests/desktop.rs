use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use bevel::prelude::*;

fn press(x: f32, y: f32) -> PointerInput {
    PointerInput::new(PointerKind::Press, x, y)
}

fn release(x: f32, y: f32) -> PointerInput {
    PointerInput::new(PointerKind::Release, x, y)
}

fn drag(x: f32, y: f32, dx: f32, dy: f32) -> PointerInput {
    PointerInput::new(PointerKind::Drag, x, y).with_movement(dx, dy)
}

#[test]
fn test_add_and_remove_keep_parent_links() {
    let mut tree = Tree::new();
    let a = tree.create(ContainerProps::new(Bounds::new(0.0, 0.0, 100.0, 100.0)));
    let b = tree.create(ContainerProps::new(Bounds::new(0.0, 0.0, 100.0, 100.0)));
    let c = tree.create(ContainerProps::new(Bounds::new(0.0, 0.0, 10.0, 10.0)));

    tree.add(a, c).unwrap();
    assert_eq!(tree.parent(c), Some(a));
    assert_eq!(tree.children(a).iter().filter(|&&id| id == c).count(), 1);

    tree.add(b, c).unwrap();
    assert!(tree.children(a).is_empty());
    assert_eq!(tree.parent(c), Some(b));

    tree.remove(b, c).unwrap();
    assert_eq!(tree.parent(c), None);
    assert!(!tree.children(b).contains(&c));
}

#[test]
fn test_contains_is_inclusive() {
    let mut tree = Tree::new();
    let id = tree.create(ContainerProps::new(Bounds::new(10.0, 20.0, 30.0, 40.0)));
    assert!(tree.contains(id, 10.0, 20.0));
    assert!(tree.contains(id, 30.0, 40.0));
    assert!(!tree.contains(id, 30.5, 40.0));
    assert!(!tree.contains(id, 9.9, 25.0));
}

#[test]
fn test_margin_layout_width() {
    let mut app = App::new().width(640);
    let root = app.root();
    let tree = app.tree_mut();
    let strip = tree.create(ContainerProps::default());
    MarginLayout::install(
        tree,
        strip,
        MarginConfig::new().margin_left(3.0).margin_right(3.0),
    )
    .unwrap();
    tree.add(root, strip).unwrap();

    assert_eq!(tree.width(strip), Some(640.0 - 6.0));
}

#[test]
fn test_welcome_dialog_dismissal() {
    let mut app = App::new();
    let dismissed = Rc::new(Cell::new(false));
    let flag = dismissed.clone();
    let dialog = Dialog::open(
        app.tree_mut(),
        DialogProps::new("Welcome", "Hello.").on_dismiss(move |_| {
            flag.set(true);
            Ok(())
        }),
    )
    .unwrap();

    // Centered 256x128: content at (275, 257), Okay at content (93, 78)
    let (x, y) = (275.0 + 120.0, 257.0 + 90.0);
    app.handle_input(press(x, y)).unwrap();
    assert!(dialog.okay().is_pressed(app.tree()));
    app.handle_input(release(x, y)).unwrap();

    assert!(dismissed.get());
    assert!(!app.tree().is_alive(dialog.id()));
    assert!(app.tree().children(app.root()).is_empty());
}

#[test]
fn test_window_drag_and_release() {
    let mut app = App::new();
    let root = app.root();
    let window = Window::new(app.tree_mut(), "Drag me", Bounds::new(100.0, 100.0, 300.0, 200.0))
        .unwrap();
    app.tree_mut().add(root, window.id()).unwrap();

    app.handle_input(press(150.0, 110.0)).unwrap();
    app.handle_input(drag(160.0, 115.0, 10.0, 5.0)).unwrap();
    app.handle_input(drag(150.0, 105.0, -10.0, -10.0)).unwrap();
    assert_eq!(
        app.tree().bounds(window.id()),
        Some(Bounds::new(100.0, 95.0, 300.0, 195.0))
    );

    app.handle_input(release(150.0, 105.0)).unwrap();
    app.handle_input(drag(180.0, 135.0, 30.0, 30.0)).unwrap();
    assert_eq!(
        app.tree().bounds(window.id()),
        Some(Bounds::new(100.0, 95.0, 300.0, 195.0))
    );
}

#[test]
fn test_dragged_window_relays_out_on_draw() {
    let mut app = App::new();
    let root = app.root();
    let window = Window::new(app.tree_mut(), "W", Bounds::new(0.0, 0.0, 200.0, 100.0)).unwrap();
    app.tree_mut().add(root, window.id()).unwrap();

    app.handle_input(press(50.0, 10.0)).unwrap();
    app.handle_input(drag(90.0, 50.0, 40.0, 40.0)).unwrap();
    assert!(app.tree().is_dirty(window.id()));

    let mut ctx = PaintContext::new();
    app.render(&mut ctx).unwrap();
    assert!(!app.tree().is_dirty(window.id()));

    // The title strip is painted at its new position
    let title = app.tree().theme().titlebar;
    let strip = ctx
        .commands()
        .iter()
        .find(|cmd| cmd.color() == title)
        .and_then(|cmd| cmd.world_rect())
        .unwrap();
    assert_eq!((strip.x, strip.y), (43.0, 43.0));
}

#[test]
fn test_button_release_outside_reverts() {
    let mut app = App::new();
    let root = app.root();
    let taskbar = Taskbar::new(app.tree_mut()).unwrap();
    app.tree_mut().add(root, taskbar.id()).unwrap();
    let start = taskbar.start();

    // Start button spans (3, 574)-(64, 597) on the desktop
    app.handle_input(press(10.0, 580.0)).unwrap();
    assert_eq!(app.tree().border_style(start.id()), Some(BorderStyle::Inset));
    app.handle_input(release(10.0, 580.0)).unwrap();
    assert_eq!(app.tree().border_style(start.id()), Some(BorderStyle::Bevel));

    app.handle_input(press(10.0, 580.0)).unwrap();
    app.handle_input(release(400.0, 100.0)).unwrap();
    assert_eq!(app.tree().border_style(start.id()), Some(BorderStyle::Bevel));
}

#[test]
fn test_routing_order_and_stop() {
    let mut app = App::new();
    let root = app.root();
    let tree = app.tree_mut();
    let log = Rc::new(RefCell::new(Vec::new()));

    let mut layers = Vec::new();
    for name in ["bottom", "middle", "top"] {
        let layer = tree.create(ContainerProps::new(Bounds::new(0.0, 0.0, 100.0, 100.0)));
        tree.add(root, layer).unwrap();
        let sink = log.clone();
        tree.on(
            layer,
            EventKind::MouseMove,
            Listener::new(move |_, _| {
                sink.borrow_mut().push(name);
                Ok(())
            }),
        )
        .unwrap();
        layers.push(layer);
    }

    app.handle_input(PointerInput::new(PointerKind::Move, 50.0, 50.0))
        .unwrap();
    assert_eq!(*log.borrow(), vec!["top", "middle", "bottom"]);

    log.borrow_mut().clear();
    app.tree_mut()
        .on(
            layers[2],
            EventKind::MouseMove,
            Listener::new(|_, event| {
                event.stop_propagation();
                Ok(())
            }),
        )
        .unwrap();
    app.handle_input(PointerInput::new(PointerKind::Move, 50.0, 50.0))
        .unwrap();
    assert_eq!(*log.borrow(), vec!["top"]);
}

struct CountingLayout {
    runs: Rc<Cell<usize>>,
}

impl Layout for CountingLayout {
    fn layout(&mut self, tree: &mut Tree, id: NodeId) -> Result<()> {
        self.runs.set(self.runs.get() + 1);
        BaseLayout.layout(tree, id)
    }
}

#[test]
fn test_second_draw_without_changes_skips_layout() {
    let mut app = App::new();
    let root = app.root();
    let runs = Rc::new(Cell::new(0));
    let tree = app.tree_mut();
    let panel = tree.create(ContainerProps::new(Bounds::new(10.0, 10.0, 50.0, 50.0)));
    tree.set_layout(panel, Box::new(CountingLayout { runs: runs.clone() }))
        .unwrap();
    tree.add(root, panel).unwrap();
    assert_eq!(runs.get(), 1);

    tree.set_top(panel, 20.0).unwrap();
    let mut ctx = PaintContext::new();
    app.render(&mut ctx).unwrap();
    assert_eq!(runs.get(), 2);

    let first = ctx.take_commands();
    app.render(&mut ctx).unwrap();
    assert_eq!(runs.get(), 2);
    assert_eq!(first, ctx.commands());
}

#[test]
fn test_barrage_fills_desktop_until_cancelled() {
    let mut app = App::new().barrage(BarrageConfig {
        initial_delay: Duration::from_millis(100),
        decay: 0.5,
        min_delay: Duration::from_millis(20),
        max_count: 50,
        ..BarrageConfig::default()
    });
    let barrage = app.start_barrage();

    app.update(Duration::from_millis(100)).unwrap();
    app.update(Duration::from_millis(50)).unwrap();
    assert_eq!(barrage.spawned(), 2);

    assert!(barrage.cancel(app.timers_mut()));
    app.update(Duration::from_secs(10)).unwrap();
    assert_eq!(barrage.spawned(), 2);
    assert_eq!(app.tree().children(app.root()).len(), 2);
}

#[test]
fn test_resized_window_brought_to_front_relays_out_parts() {
    let mut app = App::new();
    let root = app.root();
    let window = Window::new(app.tree_mut(), "W", Bounds::new(0.0, 0.0, 200.0, 100.0)).unwrap();
    app.tree_mut().add(root, window.id()).unwrap();

    app.tree_mut().set_right(window.id(), 400.0).unwrap();
    app.handle_input(press(50.0, 10.0)).unwrap();
    assert!(window.is_dragging());

    let mut ctx = PaintContext::new();
    app.render(&mut ctx).unwrap();
    assert_eq!(app.tree().width(window.id()), Some(400.0));
    assert_eq!(app.tree().width(window.content()), Some(394.0));
    assert_eq!(app.tree().width(window.titlebar()), Some(394.0));

    app.render(&mut ctx).unwrap();
    assert_eq!(app.tree().width(window.content()), Some(394.0));
}
