//! End-to-End Scenarios
//!
//! A controller and an interposed scheduler driven together, the way a host
//! page drives the runtime while debugging it frame by frame.

use runtime_api::RuntimeCapability;
use runtime_types::{ErrorRecord, RunState};
use services_frame_scheduler::{FramePrimitive, FrameScheduler};
use std::cell::Cell;
use std::rc::Rc;
use tests_lifecycle::{counting_callback, interposed_scheduler, test_bootstrap};

#[test]
fn test_load_run_then_fail() {
    let harness = test_bootstrap();

    harness.controller.set_source_code("Item{}");
    harness.controller.load().unwrap();
    assert_eq!(harness.controller.run_state(), RunState::Loading);

    assert!(harness.loader.complete(&harness.module));
    let capability = harness.module.capability().unwrap();

    capability.report_status(0);
    assert_eq!(harness.controller.run_state(), RunState::Running);

    capability.push_error(ErrorRecord::new("Item is not a type").at(1, 1));
    capability.report_status(2);
    assert_eq!(harness.controller.run_state(), RunState::Error);
    assert_eq!(harness.controller.errors().len(), capability.error_count());

    assert_eq!(
        harness.statuses(),
        vec![RunState::Loading, RunState::Running, RunState::Error]
    );
}

#[test]
fn test_paused_requests_wait_for_run() {
    let (scheduler, frames) = interposed_scheduler();
    let count = Rc::new(Cell::new(0));
    scheduler.pause();

    // Three independent callers
    let callers: Vec<Rc<dyn FramePrimitive>> = (0..3)
        .map(|_| Rc::new(scheduler.clone()) as Rc<dyn FramePrimitive>)
        .collect();
    for caller in &callers {
        caller.request_frame(counting_callback(&count));
    }

    for _ in 0..10 {
        frames.advance_frame();
    }
    assert_eq!(count.get(), 0);

    scheduler.run();
    frames.advance_frame();
    assert_eq!(count.get(), 3);
}

#[test]
fn test_paused_requests_wait_for_step() {
    let (scheduler, frames) = interposed_scheduler();
    let count = Rc::new(Cell::new(0));
    scheduler.pause();

    for _ in 0..3 {
        scheduler.request_frame(counting_callback(&count));
    }
    frames.advance_frame();
    assert_eq!(count.get(), 0);

    scheduler.step();
    frames.advance_frame();
    assert_eq!(count.get(), 3);
    assert!(!scheduler.is_running());
}

/// A render loop that re-requests a frame from every frame
fn start_render_loop(scheduler: &FrameScheduler, rendered: &Rc<Cell<usize>>) {
    fn schedule(scheduler: FrameScheduler, rendered: Rc<Cell<usize>>) {
        let next = scheduler.clone();
        scheduler.request_frame(Box::new(move |_| {
            rendered.set(rendered.get() + 1);
            schedule(next, rendered);
        }));
    }
    schedule(scheduler.clone(), rendered.clone());
}

#[test]
fn test_render_loop_single_stepping() {
    let (scheduler, frames) = interposed_scheduler();
    let rendered = Rc::new(Cell::new(0));
    start_render_loop(&scheduler, &rendered);

    for _ in 0..3 {
        frames.advance_frame();
    }
    assert_eq!(rendered.get(), 3);

    // The armed frame still lands, then the loop stalls
    scheduler.pause();
    for _ in 0..5 {
        frames.advance_frame();
    }
    assert_eq!(rendered.get(), 4);
    assert_eq!(scheduler.pending_count(), 1);

    for expected in 5..8 {
        scheduler.step();
        frames.advance_frame();
        frames.advance_frame();
        assert_eq!(rendered.get(), expected);
    }

    scheduler.run();
    for _ in 0..2 {
        frames.advance_frame();
    }
    assert_eq!(rendered.get(), 9);
}

#[test]
fn test_controller_and_scheduler_together() {
    let harness = test_bootstrap();
    let (scheduler, frames) = interposed_scheduler();
    let rendered = Rc::new(Cell::new(0));

    harness.controller.set_source_url("main.qml");
    harness.controller.load().unwrap();
    harness.loader.complete(&harness.module);
    harness.module.capability().unwrap().report_status(0);

    // The runtime starts its render loop once it is running
    if harness.controller.run_state() == RunState::Running {
        start_render_loop(&scheduler, &rendered);
    }
    scheduler.pause();
    frames.advance_frame();
    frames.advance_frame();
    assert_eq!(rendered.get(), 1);

    scheduler.step();
    frames.advance_frame();
    assert_eq!(rendered.get(), 2);

    harness.controller.dispose().unwrap();
    assert!(harness.controller.errors().is_empty());
    assert!(harness.module.capability().unwrap().is_disposed());
}
