//! Web Audio graph: source → splitter(4) → 4 gains → merger(2) → speakers.

use std::cell::RefCell;
use std::rc::Weak;
use std::time::Duration;

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    AudioBuffer, AudioBufferSourceNode, AudioContext, ChannelMergerNode, ChannelSplitterNode,
    GainNode,
};

use crate::error::PlayerError;
use crate::mixer::MixLevels;
use crate::playback::AudioPlatform;

use super::app::WebController;
use super::handles::{EventListener, Interval};
use super::{describe, js_error};

/// Fixed part of the graph, built once per page.
pub struct AudioGraph {
    context: AudioContext,
    splitter: ChannelSplitterNode,
    /// Source A left/right, source B left/right.
    gains: [GainNode; 4],
    _merger: ChannelMergerNode,
}

impl AudioGraph {
    pub fn new() -> Result<Self, PlayerError> {
        let context = AudioContext::new().map_err(js_error)?;
        let splitter = context
            .create_channel_splitter_with_number_of_outputs(4)
            .map_err(js_error)?;
        let gains = [
            context.create_gain().map_err(js_error)?,
            context.create_gain().map_err(js_error)?,
            context.create_gain().map_err(js_error)?,
            context.create_gain().map_err(js_error)?,
        ];
        let merger = context
            .create_channel_merger_with_number_of_inputs(2)
            .map_err(js_error)?;

        for (channel, gain) in gains.iter().enumerate() {
            let channel = channel as u32;
            splitter
                .connect_with_audio_node_and_output(gain, channel)
                .map_err(js_error)?;
            // Even channels are left, odd channels right.
            gain.connect_with_audio_node_and_output_and_input(&merger, 0, channel % 2)
                .map_err(js_error)?;
        }
        merger
            .connect_with_audio_node(&context.destination())
            .map_err(js_error)?;

        Ok(AudioGraph {
            context,
            splitter,
            gains,
            _merger: merger,
        })
    }
}

/// A started buffer source and its `ended` callback.
pub struct WebSource {
    node: AudioBufferSourceNode,
    _on_ended: Closure<dyn FnMut()>,
}

pub struct WebAudioPlatform {
    graph: AudioGraph,
    app: Weak<RefCell<WebController>>,
}

impl WebAudioPlatform {
    pub fn new(graph: AudioGraph, app: Weak<RefCell<WebController>>) -> Self {
        WebAudioPlatform { graph, app }
    }

    pub fn context(&self) -> &AudioContext {
        &self.graph.context
    }
}

/// Let a context state change settle in the background, logging failures.
fn settle(promise: Result<Promise, JsValue>, what: &'static str) {
    match promise {
        Ok(promise) => spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("Audio context {what} failed: {}", describe(&e));
            }
        }),
        Err(e) => log::warn!("Audio context {what} failed: {}", describe(&e)),
    }
}

impl AudioPlatform for WebAudioPlatform {
    type Buffer = AudioBuffer;
    type Source = WebSource;
    type Ticker = Interval;
    type TiltListener = EventListener;

    fn current_time(&self) -> f64 {
        self.graph.context.current_time()
    }

    fn resume(&mut self) {
        settle(self.graph.context.resume(), "resume");
    }

    fn suspend(&mut self) {
        settle(self.graph.context.suspend(), "suspend");
    }

    fn buffer_duration(&self, buffer: &AudioBuffer) -> f64 {
        buffer.duration()
    }

    fn start_source(
        &mut self,
        buffer: &AudioBuffer,
        offset: f64,
        generation: u64,
    ) -> Result<WebSource, PlayerError> {
        let node = self
            .graph
            .context
            .create_buffer_source()
            .map_err(js_error)?;
        node.set_buffer(Some(buffer));
        node.connect_with_audio_node(&self.graph.splitter)
            .map_err(js_error)?;

        // Deferred so the controller can drop this closure while stopping.
        let app = self.app.clone();
        let on_ended = Closure::<dyn FnMut()>::new(move || {
            let app = app.clone();
            spawn_local(async move {
                if let Some(app) = app.upgrade() {
                    app.borrow_mut().on_source_ended(generation);
                }
            });
        });
        node.set_onended(Some(on_ended.as_ref().unchecked_ref()));
        node.start_with_when_and_grain_offset(0.0, offset)
            .map_err(|e| PlayerError::Graph(describe(&e)))?;

        Ok(WebSource {
            node,
            _on_ended: on_ended,
        })
    }

    fn stop_source(&mut self, source: WebSource) {
        source.node.set_onended(None);
        if let Err(e) = source.node.stop() {
            log::debug!("Source already stopped: {}", describe(&e));
        }
        if let Err(e) = source.node.disconnect() {
            log::debug!("Source already disconnected: {}", describe(&e));
        }
    }

    fn apply_levels(&mut self, levels: &MixLevels) {
        for (gain, level) in self.graph.gains.iter().zip(levels.channel_gains()) {
            gain.gain().set_value(level as f32);
        }
    }

    fn start_ticker(&mut self, interval: Duration) -> Result<Interval, PlayerError> {
        let app = self.app.clone();
        Interval::new(interval, move || {
            if let Some(app) = app.upgrade() {
                if let Ok(mut controller) = app.try_borrow_mut() {
                    controller.tick();
                }
            }
        })
    }
}

/// Fetch `url` and decode it with the page's audio context.
pub async fn fetch_and_decode(context: AudioContext, url: String) -> Result<AudioBuffer, PlayerError> {
    let fetch_error = |reason: String| PlayerError::Fetch {
        url: url.clone(),
        reason,
    };
    let window = web_sys::window().ok_or_else(|| fetch_error("no window".into()))?;

    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(&url))
        .await
        .map_err(|e| fetch_error(describe(&e)))?
        .dyn_into()
        .map_err(|e| fetch_error(describe(&e)))?;
    if !response.ok() {
        return Err(fetch_error(format!("HTTP {}", response.status())));
    }

    let bytes = JsFuture::from(response.array_buffer().map_err(|e| fetch_error(describe(&e)))?)
        .await
        .map_err(|e| fetch_error(describe(&e)))?;
    let bytes: js_sys::ArrayBuffer = bytes
        .dyn_into()
        .map_err(|e| fetch_error(describe(&e)))?;

    let decoded = JsFuture::from(
        context
            .decode_audio_data(&bytes)
            .map_err(|e| PlayerError::Decode(describe(&e)))?,
    )
    .await
    .map_err(|e| PlayerError::Decode(describe(&e)))?;
    decoded
        .dyn_into::<AudioBuffer>()
        .map_err(|e| PlayerError::Decode(describe(&e)))
}
