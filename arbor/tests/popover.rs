use std::sync::{Arc, Mutex};

use arbor::popover::{Boundary, Popover};

/// Element ids inside the trigger and the drop-down.
fn trigger(target: &str) -> bool {
    target.starts_with("trigger")
}

fn dropdown(target: &str) -> bool {
    target.starts_with("calendar")
}

fn boundaries() -> [&'static dyn Boundary<str>; 2] {
    [&trigger, &dropdown]
}

#[test]
fn test_focus_outside_closes() {
    let mut popover = Popover::new(true);

    assert!(popover.on_focus("footer-link", &boundaries()));
    assert!(!popover.is_expanded());
}

#[test]
fn test_focus_inside_keeps_open() {
    let mut popover = Popover::new(true);

    assert!(!popover.on_focus("calendar-day-12", &boundaries()));
    assert!(!popover.on_focus("trigger-input", &boundaries()));
    assert!(popover.is_expanded());
}

#[test]
fn test_focus_while_closed_is_ignored() {
    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);
    let mut popover = Popover::new(false).with_on_expanded_change(move |_| {
        *counter.lock().unwrap() += 1;
    });

    assert!(!popover.on_focus("elsewhere", &boundaries()));
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[test]
fn test_trigger_toggles() {
    let mut popover = Popover::default();
    popover.toggle();
    assert!(popover.is_expanded());
    popover.toggle();
    assert!(!popover.is_expanded());
}

#[test]
fn test_controlled_popover_only_notifies() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut popover =
        Popover::controlled(true).with_on_expanded_change(move |expanded| sink.lock().unwrap().push(expanded));

    assert!(popover.on_focus("elsewhere", &boundaries()));
    assert!(popover.is_expanded());
    assert_eq!(*seen.lock().unwrap(), vec![false]);

    // The owner accepts
    popover.sync(false);
    assert!(!popover.is_expanded());
}
