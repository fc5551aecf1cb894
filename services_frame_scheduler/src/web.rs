//! Browser binding for `window.requestAnimationFrame`.
//!
//! `install` captures the window's current primitive, interposes the scheduler
//! on it and replaces the global with a forwarder, so page scripts and the
//! runtime go through the scheduler without knowing it.

use crate::primitive::{FrameCallback, FramePrimitive, FrameTime};
use crate::scheduler::FrameScheduler;
use js_sys::{Function, Reflect};
use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

const REQUEST_ANIMATION_FRAME: &str = "requestAnimationFrame";

/// The window's un-interposed `requestAnimationFrame`
pub struct WindowAnimationFrame {
    window: web_sys::Window,
    real: Function,
}

impl WindowAnimationFrame {
    /// Captures the function currently installed on the window
    pub fn capture() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let real = Reflect::get(&window, &JsValue::from_str(REQUEST_ANIMATION_FRAME))?
            .dyn_into::<Function>()?;
        Ok(Self { window, real })
    }
}

impl FramePrimitive for WindowAnimationFrame {
    fn request_frame(&self, callback: FrameCallback) {
        let closure = Closure::once_into_js(move |timestamp: f64| {
            callback(FrameTime::from_millis(timestamp));
        });
        if let Err(err) = self.real.call1(&self.window, &closure) {
            warn!(?err, "requestAnimationFrame rejected callback");
        }
    }
}

/// Interposes `scheduler` on the window's `requestAnimationFrame`
pub fn install(scheduler: &FrameScheduler) -> Result<(), JsValue> {
    let real = WindowAnimationFrame::capture()?;
    let window = real.window.clone();
    scheduler
        .interpose(Rc::new(real))
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    let forwarder = scheduler.clone();
    let replacement = Closure::<dyn FnMut(Function) -> u32>::new(move |callback: Function| {
        forwarder.request_frame(Box::new(move |time: FrameTime| {
            if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_f64(time.as_millis())) {
                warn!(?err, "frame callback threw");
            }
        }));
        // Individual requests cannot be cancelled, so there is no real handle
        0
    });

    Reflect::set(
        &window,
        &JsValue::from_str(REQUEST_ANIMATION_FRAME),
        replacement.as_ref(),
    )?;
    // The global keeps calling this closure for the rest of the page's life
    replacement.forget();

    debug!("window.requestAnimationFrame interposed");
    Ok(())
}
