//! Page entry point: builds the controller and wires DOM events into it.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    DeviceOrientationEvent, Event, HtmlElement, HtmlInputElement, MouseEvent,
    OrientationLockType, ServiceWorkerRegistration, Window,
};

use crate::config::PlayerConfig;
use crate::device::{user_agent_is_mobile, Capabilities, InputMode, PermissionFlow};
use crate::error::PlayerError;
use crate::playback::{MixerController, StartOutcome, ToggleOutcome};

use super::audio::{fetch_and_decode, AudioGraph, WebAudioPlatform};
use super::handles::EventListener;
use super::view::{element, DomView};
use super::{config_from_js, describe, init_logging, to_js};

pub type WebController = MixerController<WebAudioPlatform, DomView>;

type Shared = Rc<RefCell<WebController>>;

/// A mounted player. Keep it alive for as long as the page runs; dropping it
/// detaches every DOM listener.
#[wasm_bindgen]
pub struct MixerApp {
    controller: Shared,
    _listeners: Vec<EventListener>,
}

#[wasm_bindgen]
impl MixerApp {
    /// Current crossfade position in [0, 1].
    pub fn mix(&self) -> f64 {
        self.controller.borrow().levels().source_b
    }

    /// Whether audio is currently playing.
    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.controller.borrow().session().is_some()
    }
}

/// WASM-exposed: mount the player on the current page.
#[wasm_bindgen(js_name = startMixer)]
pub fn start_mixer(config: JsValue) -> Result<MixerApp, JsValue> {
    let config: PlayerConfig = config_from_js(config)?;
    init_logging(config.debug);
    config.validate().map_err(to_js)?;
    mount(config).map_err(to_js)
}

fn mount(config: PlayerConfig) -> Result<MixerApp, PlayerError> {
    let window = web_sys::window().ok_or_else(|| PlayerError::Js("no window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| PlayerError::Js("no document".into()))?;

    let capabilities = detect_capabilities(&window);
    let input_mode = capabilities.input_mode();
    let permission_flow = capabilities.permission_flow();
    log::debug!("Capabilities: {capabilities:?}");

    let view = DomView::bind(&document)?;
    let graph = AudioGraph::new()?;
    let worker_url = config.service_worker_url.clone();
    let lock_portrait = config.lock_portrait;
    let controller: Shared = Rc::new_cyclic(|weak| {
        let platform = WebAudioPlatform::new(graph, weak.clone());
        RefCell::new(MixerController::new(platform, view, config, input_mode))
    });

    let mut listeners = Vec::new();

    let start_button: HtmlElement = element(&document, "startButton")?;
    let app = controller.clone();
    listeners.push(EventListener::new(&start_button, "click", move |_| {
        on_trigger(&app, permission_flow);
    })?);

    if input_mode == InputMode::Slider {
        let slider: HtmlInputElement = element(&document, "mixerSlider")?;
        let app = controller.clone();
        let input = slider.clone();
        listeners.push(EventListener::new(&slider, "input", move |_| {
            if let Ok(value) = input.value().parse::<f64>() {
                app.borrow_mut().on_slider(value);
            }
        })?);
    }

    let progress: HtmlElement = element(&document, "progress-container")?;
    let app = controller.clone();
    let container = progress.clone();
    listeners.push(EventListener::new(&progress, "click", move |event: Event| {
        let Some(click) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let width = f64::from(container.client_width());
        // Errors are logged and surfaced by the controller.
        let _ = app
            .borrow_mut()
            .seek_fraction(f64::from(click.offset_x()), width);
    })?);

    for (kind, online) in [("online", true), ("offline", false)] {
        let app = controller.clone();
        listeners.push(EventListener::new(&window, kind, move |_| {
            app.borrow_mut().set_online(online);
        })?);
    }

    {
        let mut c = controller.borrow_mut();
        c.initialize();
        c.set_online(window.navigator().on_line());
    }

    register_service_worker(&window, &worker_url);
    if lock_portrait {
        lock_portrait_orientation(&window);
    }

    Ok(MixerApp {
        controller,
        _listeners: listeners,
    })
}

fn detect_capabilities(window: &Window) -> Capabilities {
    let orientation_ctor = Reflect::get(window, &JsValue::from_str("DeviceOrientationEvent"))
        .ok()
        .filter(|ctor| !ctor.is_undefined());
    let orientation_permission_prompt = orientation_ctor
        .as_ref()
        .and_then(|ctor| Reflect::get(ctor, &JsValue::from_str("requestPermission")).ok())
        .is_some_and(|f| f.is_function());
    let coarse_pointer = window
        .match_media("(pointer: coarse)")
        .ok()
        .flatten()
        .map(|query| query.matches());
    let user_agent_mobile = window
        .navigator()
        .user_agent()
        .map(|ua| user_agent_is_mobile(&ua))
        .unwrap_or(false);

    Capabilities {
        orientation_events: orientation_ctor.is_some(),
        orientation_permission_prompt,
        coarse_pointer,
        user_agent_mobile,
    }
}

fn on_trigger(app: &Shared, permission_flow: PermissionFlow) {
    let outcome = app.borrow_mut().toggle();
    match outcome {
        Ok(ToggleOutcome::Started(StartOutcome::Fetch { url })) => {
            let context = app.borrow().platform().context().clone();
            let app = app.clone();
            spawn_local(async move {
                let result = fetch_and_decode(context, url).await;
                // Failures are logged and shown by the controller.
                let _ = app.borrow_mut().finish_load(result);
            });
        }
        Ok(_) => {}
        // Already logged and shown by the controller.
        Err(e) => log::debug!("Trigger failed: {e}"),
    }

    if app.borrow().needs_tilt_listener() {
        request_orientation(app, permission_flow);
    }
}

/// Must run inside the click handler: iOS only shows the prompt for a
/// request made during a user gesture.
fn request_orientation(app: &Shared, flow: PermissionFlow) {
    let prompt = match flow {
        PermissionFlow::Implicit => None,
        PermissionFlow::Prompt => permission_prompt(),
    };
    let Some(prompt) = prompt else {
        if app.borrow_mut().on_permission(true).is_ok() {
            attach_orientation(app);
        }
        return;
    };

    let app = app.clone();
    spawn_local(async move {
        match JsFuture::from(prompt).await {
            Ok(state) => {
                let granted = state.as_string().as_deref() == Some("granted");
                if app.borrow_mut().on_permission(granted).is_ok() {
                    attach_orientation(&app);
                }
            }
            Err(e) => log::error!("Orientation permission request failed: {}", describe(&e)),
        }
    });
}

fn permission_prompt() -> Option<Promise> {
    let window = web_sys::window()?;
    let ctor = Reflect::get(&window, &JsValue::from_str("DeviceOrientationEvent")).ok()?;
    let request: js_sys::Function = Reflect::get(&ctor, &JsValue::from_str("requestPermission"))
        .ok()?
        .dyn_into()
        .ok()?;
    request.call0(&ctor).ok()?.dyn_into().ok()
}

fn attach_orientation(app: &Shared) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let weak = Rc::downgrade(app);
    let listener = EventListener::new(&window, "deviceorientation", move |event: Event| {
        let Some(event) = event.dyn_ref::<DeviceOrientationEvent>() else {
            return;
        };
        if let Some(app) = weak.upgrade() {
            if let Ok(mut controller) = app.try_borrow_mut() {
                controller.on_tilt(event.beta());
            }
        }
    });
    match listener {
        Ok(listener) => app.borrow_mut().attach_tilt(listener),
        Err(e) => log::error!("Failed to listen for orientation: {e}"),
    }
}

fn register_service_worker(window: &Window, url: &str) {
    let navigator = window.navigator();
    if !Reflect::has(&navigator, &JsValue::from_str("serviceWorker")).unwrap_or(false) {
        log::info!("Service workers unsupported; running without offline cache");
        return;
    }
    let registration = navigator.service_worker().register(url);
    spawn_local(async move {
        match JsFuture::from(registration).await {
            Ok(reg) => {
                let scope = reg
                    .dyn_into::<ServiceWorkerRegistration>()
                    .map(|r| r.scope())
                    .unwrap_or_default();
                log::info!("ServiceWorker registered with scope: {scope}");
            }
            Err(e) => log::warn!("ServiceWorker registration failed: {}", describe(&e)),
        }
    });
}

fn lock_portrait_orientation(window: &Window) {
    let lock = window
        .screen()
        .map(|screen| screen.orientation())
        .and_then(|orientation| orientation.lock(OrientationLockType::Portrait));
    let promise = match lock {
        Ok(promise) => promise,
        Err(e) => {
            log::warn!("Screen orientation lock failed: {}", describe(&e));
            return;
        }
    };
    spawn_local(async move {
        if let Err(e) = JsFuture::from(promise).await {
            log::warn!("Screen orientation lock failed: {}", describe(&e));
        }
    });
}
