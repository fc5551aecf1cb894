//! Frame Scheduling Integration Tests
//!
//! These tests validate the interposing frame scheduler against a simulated
//! display:
//! - FIFO delivery, each registration exactly once
//! - Pause holds frames, step delivers one firing
//! - Pending-request observer ordering
//! - Guarded interposition

use proptest::prelude::*;
use services_frame_scheduler::{FramePrimitive, FrameScheduler, SchedulerError};
use sim_runtime::SimFramePrimitive;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tests_lifecycle::{counting_callback, interposed_scheduler, observer_log, recording_callback};

#[test]
fn test_fifo_single_firing() {
    let (scheduler, frames) = interposed_scheduler();
    let log = Rc::new(RefCell::new(Vec::new()));

    scheduler.request_frame(recording_callback(&log, "A"));
    scheduler.request_frame(recording_callback(&log, "B"));
    scheduler.request_frame(recording_callback(&log, "C"));

    // One real request serves the whole queue
    assert_eq!(frames.request_count(), 1);
    frames.advance_frame();
    frames.advance_frame();

    assert_eq!(*log.borrow(), vec!["A", "B", "C"]);
    assert_eq!(scheduler.firings(), 1);
}

#[test]
fn test_callbacks_registered_during_drain_wait() {
    let (scheduler, frames) = interposed_scheduler();
    let log = Rc::new(RefCell::new(Vec::new()));

    let inner_scheduler = scheduler.clone();
    let inner_log = log.clone();
    scheduler.request_frame(Box::new(move |_| {
        inner_log.borrow_mut().push("outer");
        inner_scheduler.request_frame(recording_callback(&inner_log, "inner"));
    }));

    frames.advance_frame();
    assert_eq!(*log.borrow(), vec!["outer"]);
    assert_eq!(scheduler.pending_count(), 1);

    frames.advance_frame();
    assert_eq!(*log.borrow(), vec!["outer", "inner"]);
}

#[test]
fn test_pause_holds_natural_firings() {
    let (scheduler, frames) = interposed_scheduler();
    let count = Rc::new(Cell::new(0));

    scheduler.pause();
    scheduler.request_frame(counting_callback(&count));
    scheduler.request_frame(counting_callback(&count));
    for _ in 0..5 {
        frames.advance_frame();
    }
    assert_eq!(count.get(), 0);
    assert_eq!(frames.request_count(), 0);

    scheduler.step();
    frames.advance_frame();
    assert_eq!(count.get(), 2);
    assert!(!scheduler.is_running());

    // Stepping with nothing queued fires an empty frame
    scheduler.step();
    frames.advance_frame();
    assert_eq!(count.get(), 2);
    assert_eq!(scheduler.firings(), 2);
}

#[test]
fn test_pause_does_not_cancel_armed_firing() {
    let (scheduler, frames) = interposed_scheduler();
    let count = Rc::new(Cell::new(0));

    scheduler.request_frame(counting_callback(&count));
    scheduler.pause();
    frames.advance_frame();

    assert_eq!(count.get(), 1);
}

#[test]
fn test_run_rearms_queued_work() {
    let (scheduler, frames) = interposed_scheduler();
    let count = Rc::new(Cell::new(0));

    scheduler.pause();
    scheduler.request_frame(counting_callback(&count));
    scheduler.run();
    assert!(scheduler.is_armed());

    frames.advance_frame();
    assert_eq!(count.get(), 1);
    assert!(!scheduler.is_armed());

    // Nothing queued: run arms nothing
    scheduler.pause();
    scheduler.run();
    assert!(!scheduler.is_armed());
}

#[test]
fn test_toggle_pause() {
    let (scheduler, _frames) = interposed_scheduler();
    assert!(scheduler.is_running());
    scheduler.toggle_pause();
    assert!(!scheduler.is_running());
    scheduler.toggle_pause();
    assert!(scheduler.is_running());
}

#[test]
fn test_observer_true_on_request_false_before_drain() {
    let (scheduler, frames) = interposed_scheduler();
    let (log, observer) = observer_log();
    scheduler.set_pending_request_observer(Some(observer));

    let seen_at_drain = log.clone();
    let drained = Rc::new(RefCell::new(Vec::new()));
    let drained_log = drained.clone();
    scheduler.request_frame(Box::new(move |_| {
        drained_log.borrow_mut().extend(seen_at_drain.borrow().iter().copied());
    }));
    assert_eq!(*log.borrow(), vec![true]);

    frames.advance_frame();
    assert_eq!(*log.borrow(), vec![true, false]);
    // `false` was delivered before the callback ran
    assert_eq!(*drained.borrow(), vec![true, false]);
}

#[test]
fn test_observer_removed() {
    let (scheduler, frames) = interposed_scheduler();
    let (log, observer) = observer_log();
    scheduler.set_pending_request_observer(Some(observer));
    scheduler.set_pending_request_observer(None);

    scheduler.request_frame(Box::new(|_| {}));
    frames.advance_frame();
    assert!(log.borrow().is_empty());
}

#[test]
fn test_interpose_twice_fails() {
    let (scheduler, frames) = interposed_scheduler();
    let other = SimFramePrimitive::new();

    assert_eq!(
        scheduler.interpose(Rc::new(other.clone())),
        Err(SchedulerError::AlreadyInterposed)
    );

    scheduler.request_frame(Box::new(|_| {}));
    assert_eq!(frames.request_count(), 1);
    assert_eq!(other.request_count(), 0);
}

#[test]
fn test_requests_before_interpose_are_armed_on_interpose() {
    let scheduler = FrameScheduler::new();
    let count = Rc::new(Cell::new(0));
    scheduler.request_frame(counting_callback(&count));

    let frames = SimFramePrimitive::new();
    scheduler.interpose(Rc::new(frames.clone())).unwrap();
    frames.advance_frame();

    assert_eq!(count.get(), 1);
}

#[test]
fn test_frame_time_passed_through() {
    let frames = SimFramePrimitive::with_interval(20.0);
    let scheduler = FrameScheduler::new();
    scheduler.interpose(Rc::new(frames.clone())).unwrap();

    let times = Rc::new(RefCell::new(Vec::new()));
    for _ in 0..2 {
        let log = times.clone();
        scheduler.request_frame(Box::new(move |time| log.borrow_mut().push(time.as_millis())));
        frames.advance_frame();
    }

    assert_eq!(*times.borrow(), vec![20.0, 40.0]);
}

proptest! {
    #[test]
    fn test_every_registration_fires_once_in_order(
        batches in prop::collection::vec(1usize..6, 1..8),
        paused in any::<bool>(),
    ) {
        let (scheduler, frames) = interposed_scheduler();
        if paused {
            scheduler.pause();
        }
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut expected = Vec::new();
        let mut next = 0usize;

        for batch in batches {
            for _ in 0..batch {
                let id = next;
                next += 1;
                expected.push(id);
                let sink = log.clone();
                scheduler.request_frame(Box::new(move |_| sink.borrow_mut().push(id)));
            }
            if paused {
                frames.advance_frame();
                prop_assert!(log.borrow().len() < expected.len());
                scheduler.step();
            }
            frames.advance_frame();
            prop_assert_eq!(&*log.borrow(), &expected);
        }
    }
}
