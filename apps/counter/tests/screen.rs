use tally_app::*;
use tally_core::*;
use tally_counter::{Bounds, CounterStore, ManualClock, Operation};
use tally_platform::PointerRouter;
use tally_ui::{Interactions, layout_and_paint};

const T0: u64 = 1_700_000_000_000;

fn app_at(t: u64) -> (CounterApp, ManualClock) {
    let clock = ManualClock::new(t);
    let store = CounterStore::with_clock(Bounds::DEFAULT, clock.clone());
    (CounterApp::with_store(store, clock.clone()), clock)
}

fn render(app: &CounterApp) -> Frame {
    let locals = Locals::default();
    layout_and_paint(&app.view(&locals), (400, 800), &locals, &Interactions::default())
}

fn texts(frame: &Frame) -> Vec<&str> {
    frame.scene.texts().collect()
}

/// Fires the click callback of the button labelled `label`, if it has one.
fn click(frame: &Frame, label: &str) -> bool {
    let sem = frame.semantics_by_label(label).unwrap();
    match frame.hit_region(sem.id).and_then(|h| h.on_click.clone()) {
        Some(cb) => {
            cb();
            true
        }
        None => false,
    }
}

#[test]
fn initial_screen_shows_zero_and_placeholder() {
    let (app, _clock) = app_at(T0);
    let frame = render(&app);
    let t = texts(&frame);
    assert!(t.contains(&"0"));
    assert!(t.contains(&EMPTY_HISTORY));

    let dec = frame.semantics_by_label(DECREMENT_LABEL).unwrap();
    assert_eq!(dec.role, Role::Button);
    assert!(!dec.enabled);
    assert!(frame.hit_region(dec.id).is_none());

    let inc = frame.semantics_by_label(INCREMENT_LABEL).unwrap();
    assert!(inc.enabled);
    assert!(frame.hit_region(inc.id).is_some());
}

#[test]
fn clicking_increment_updates_value_and_history() {
    let (app, _clock) = app_at(T0);
    let frame = render(&app);
    assert!(click(&frame, INCREMENT_LABEL));

    let frame = render(&app);
    let t = texts(&frame);
    assert!(t.contains(&"1"));
    assert!(t.contains(&"Incremented from 0 to 1"));
    assert!(t.contains(&"a few seconds ago"));
    assert!(!t.contains(&EMPTY_HISTORY));
    assert!(frame.semantics_by_label(DECREMENT_LABEL).unwrap().enabled);

    // The list is outlined once it has rows
    let outline = Locals::default().theme.outline;
    assert!(frame.scene.nodes.iter().any(|n| matches!(
        n,
        SceneNode::Border { color, .. } if *color == outline
    )));
}

#[test]
fn ten_increments_disable_increment() {
    let (app, clock) = app_at(T0);
    for _ in 0..10 {
        clock.advance(1_000);
        let frame = render(&app);
        assert!(click(&frame, INCREMENT_LABEL));
    }
    let frame = render(&app);
    assert!(texts(&frame).contains(&"10"));
    let inc = frame.semantics_by_label(INCREMENT_LABEL).unwrap();
    assert!(!inc.enabled);
    assert!(!click(&frame, INCREMENT_LABEL));
    assert_eq!(app.store().len(), 10);

    // Newest row is painted first
    let first_row = texts(&frame)
        .into_iter()
        .find(|s| s.starts_with("Incremented"))
        .unwrap();
    assert_eq!(first_row, "Incremented from 9 to 10");
}

#[test]
fn history_rows_are_keyed_by_timestamp() {
    let (app, clock) = app_at(T0);
    app.dispatch(Operation::Increment);
    clock.advance(250);
    app.dispatch(Operation::Increment);
    clock.advance(250);
    app.dispatch(Operation::Decrement);

    let frame = render(&app);
    let key_of = |label: &str| frame.semantics_by_label(label).and_then(|n| n.key);
    assert_eq!(key_of("Incremented from 0 to 1"), Some(T0));
    assert_eq!(key_of("Incremented from 1 to 2"), Some(T0 + 250));
    assert_eq!(key_of("Decremented from 2 to 1"), Some(T0 + 500));
}

#[test]
fn relative_times_follow_the_clock() {
    let (app, clock) = app_at(T0);
    app.dispatch(Operation::Increment);
    clock.advance(5 * 60_000);
    let frame = render(&app);
    assert!(texts(&frame).contains(&"5 minutes ago"));
}

#[test]
fn same_millisecond_entries_read_as_past() {
    let (app, _clock) = app_at(T0);
    app.dispatch(Operation::Increment);
    app.dispatch(Operation::Increment);
    assert_eq!(app.store().latest().map(|e| e.timestamp()), Some(T0 + 1));

    let frame = render(&app);
    let t = texts(&frame);
    assert_eq!(t.iter().filter(|s| **s == "a few seconds ago").count(), 2);
    assert!(!t.iter().any(|s| s.starts_with("in ")));
}

#[test]
fn clock_set_back_does_not_show_future_times() {
    let (app, clock) = app_at(T0);
    app.dispatch(Operation::Increment);
    clock.set(T0 - 3 * 3_600_000);
    app.dispatch(Operation::Increment);

    let frame = render(&app);
    let t = texts(&frame);
    assert!(t.contains(&"Incremented from 1 to 2"));
    assert_eq!(t.iter().filter(|s| **s == "a few seconds ago").count(), 2);
    assert!(!t.iter().any(|s| s.starts_with("in ")));
}

#[test]
fn new_entry_scrolls_history_to_top() {
    let (app, clock) = app_at(T0);
    for i in 0..30 {
        clock.advance(10);
        let op = if i % 2 == 0 {
            Operation::Increment
        } else {
            Operation::Decrement
        };
        app.dispatch(op);
    }
    let frame = render(&app);
    let scroll = frame
        .hit_regions
        .iter()
        .find_map(|h| h.on_scroll.clone())
        .unwrap();
    scroll(Vec2::new(0.0, 200.0));
    assert!(app.list_state().offset() > 0.0);

    app.dispatch(Operation::Increment);
    assert_eq!(app.list_state().offset(), 0.0);
}

#[test]
fn refused_transition_keeps_scroll_position() {
    let (app, clock) = app_at(T0);
    for i in 0..30 {
        clock.advance(10);
        app.dispatch(if i % 2 == 0 {
            Operation::Increment
        } else {
            Operation::Decrement
        });
    }
    // Value is 0 after an even number of alternating steps
    assert_eq!(app.store().value(), 0);
    let frame = render(&app);
    let scroll = frame
        .hit_regions
        .iter()
        .find_map(|h| h.on_scroll.clone())
        .unwrap();
    scroll(Vec2::new(0.0, 120.0));
    let before = app.list_state().offset();
    assert!(before > 0.0);

    app.dispatch(Operation::Decrement);
    assert_eq!(app.store().len(), 30);
    assert_eq!(app.list_state().offset(), before);
}

#[test]
fn pointer_press_and_release_clicks_button() {
    let (app, _clock) = app_at(T0);
    let frame = render(&app);
    let inc = frame.semantics_by_label(INCREMENT_LABEL).unwrap().rect;

    let mut router = PointerRouter::new();
    router.pointer_moved(&frame, inc.center());
    assert!(router.press(&frame));
    assert!(router.release(&frame));
    assert_eq!(app.store().value(), 1);

    // Pressing the disabled decrement button does nothing
    app.dispatch(Operation::Decrement);
    let frame = render(&app);
    let dec = frame.semantics_by_label(DECREMENT_LABEL).unwrap().rect;
    router.pointer_moved(&frame, dec.center());
    assert!(!router.press(&frame));
    assert_eq!(app.store().value(), 0);
}
