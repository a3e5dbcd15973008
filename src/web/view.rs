//! DOM surface of the player page.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement};

use crate::device::InputMode;
use crate::error::PlayerError;
use crate::mixer::MixLevels;
use crate::playback::{PlayerView, Progress, TriggerLabel};

pub(crate) fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, PlayerError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| PlayerError::Js(format!("missing element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| PlayerError::Js(format!("element #{id} has an unexpected type")))
}

fn set_style(el: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = el.style().set_property(property, value) {
        log::warn!("Failed to set {property}: {}", super::describe(&e));
    }
}

fn show(el: &HtmlElement, visible: bool) {
    set_style(el, "display", if visible { "block" } else { "none" });
}

pub struct DomView {
    start_button: HtmlButtonElement,
    loading_indicator: HtmlElement,
    output_orientation: HtmlElement,
    rotation_bar: HtmlElement,
    indicator: Option<HtmlElement>,
    image1: HtmlElement,
    image2: HtmlElement,
    offline_indicator: HtmlElement,
    progress_bar: HtmlElement,
    time_display: Element,
    slider_container: HtmlElement,
    title: Option<HtmlElement>,
}

impl DomView {
    pub fn bind(document: &Document) -> Result<Self, PlayerError> {
        Ok(DomView {
            start_button: element(document, "startButton")?,
            loading_indicator: element(document, "loading-indicator")?,
            output_orientation: element(document, "output-orientation")?,
            rotation_bar: element(document, "rotation-bar")?,
            indicator: element(document, "indicator").ok(),
            image1: element(document, "image1")?,
            image2: element(document, "image2")?,
            offline_indicator: element(document, "offline-indicator")?,
            progress_bar: element(document, "progress-bar")?,
            time_display: element(document, "time-display")?,
            slider_container: element(document, "slider-container")?,
            title: document
                .query_selector("h1")
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into().ok()),
        })
    }
}

impl PlayerView for DomView {
    fn set_trigger(&mut self, label: TriggerLabel, enabled: bool) {
        self.start_button.set_text_content(Some(label.as_str()));
        self.start_button.set_disabled(!enabled);
        let _ = self.start_button.remove_attribute("data-state");
    }

    fn set_loading(&mut self, visible: bool) {
        show(&self.loading_indicator, visible);
    }

    fn set_title_visible(&mut self, visible: bool) {
        if let Some(title) = &self.title {
            set_style(title, "opacity", if visible { "1" } else { "0" });
        }
    }

    fn set_progress(&mut self, progress: &Progress) {
        set_style(&self.progress_bar, "width", &format!("{}%", progress.percent()));
        self.time_display.set_text_content(Some(&progress.label()));
    }

    fn set_artwork(&mut self, levels: &MixLevels) {
        set_style(&self.image1, "opacity", &levels.image_a_opacity().to_string());
        set_style(&self.image2, "opacity", &levels.image_b_opacity().to_string());
    }

    fn show_input_mode(&mut self, mode: InputMode, debug: bool) {
        let tilt = mode == InputMode::Tilt;
        show(&self.slider_container, !tilt);
        show(&self.output_orientation, tilt && debug);
        show(&self.rotation_bar, tilt && debug);
    }

    fn show_tilt_debug(&mut self, beta: f64, indicator_percent: f64) {
        self.output_orientation
            .set_text_content(Some(&format!("Orientation: {beta:.2}°")));
        if let Some(indicator) = &self.indicator {
            set_style(
                indicator,
                "transform",
                &format!("translateX({indicator_percent}%)"),
            );
        }
    }

    fn set_offline(&mut self, offline: bool) {
        show(&self.offline_indicator, offline);
    }

    fn show_error(&mut self, message: &str) {
        let _ = self.start_button.set_attribute("data-state", "error");
        self.time_display.set_text_content(Some(message));
    }

    fn alert(&mut self, message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }
}
