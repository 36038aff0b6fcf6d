/// Hand3D Web - WASM binding for a browser page
///
/// The page owns the canvas and draws a unit cylinder per segment with the
/// matrices returned by `world_matrices`. Sliders call `set_channel` with
/// their element id; the readout lands in the page's `#log` element.
use hand3d_core::{ChannelBank, ChannelId, Hand, HandError, PoseController, PoseScript, SegmentId, Tuning};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WebHand {
    hand: Hand,
    bank: ChannelBank,
}

#[wasm_bindgen]
impl WebHand {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebHand {
        Self::from_tuning(Tuning::default())
    }

    /// Hand with tuning constants from a JSON document
    pub fn with_tuning(json: &str) -> Result<WebHand, JsValue> {
        let tuning = Tuning::from_json_str(json).map_err(js_error)?;
        Ok(Self::from_tuning(tuning))
    }

    /// Slider ids in panel order
    pub fn channel_ids(&self) -> Box<[JsValue]> {
        self.bank
            .channels()
            .iter()
            .map(|channel| JsValue::from_str(&channel.id.to_string()))
            .collect()
    }

    /// `[min, max, default]` of a slider
    pub fn channel_range(&self, id: &str) -> Result<Box<[f32]>, JsValue> {
        let range = parse_channel(id)?.range();
        Ok(vec![range.min, range.max, range.default].into_boxed_slice())
    }

    /// Apply a slider value and show "id: value" in the status element
    pub fn set_channel(&mut self, id: &str, value: f32) -> Result<String, JsValue> {
        let channel = parse_channel(id)?;
        Ok(self.set(channel, value))
    }

    pub fn channel_value(&self, id: &str) -> Result<f32, JsValue> {
        Ok(self.bank.value(parse_channel(id)?))
    }

    /// Replay a pose script
    pub fn apply_script(&mut self, text: &str) -> Result<(), JsValue> {
        let script = PoseScript::parse(text).map_err(js_error)?;
        script.apply(&mut self.bank, &mut self.hand);
        if let Some(status) = self.bank.last_status() {
            show_status(&status);
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.bank.reset(&mut self.hand);
    }

    pub fn segment_count(&self) -> usize {
        self.hand.segment_count()
    }

    /// Column-major 4x4 model matrices, 16 floats per segment
    pub fn world_matrices(&self) -> Box<[f32]> {
        self.hand
            .world_segments()
            .iter()
            .flat_map(|(_, matrix)| matrix.as_slice().to_vec())
            .collect()
    }

    /// Segment labels matching the order of `world_matrices`
    pub fn segment_labels(&self) -> Box<[JsValue]> {
        self.labels().iter().map(|label| JsValue::from_str(label)).collect()
    }
}

impl WebHand {
    fn from_tuning(tuning: Tuning) -> Self {
        let hand = Hand::build();
        let bank = ChannelBank::new(&hand, PoseController::new(tuning));
        Self { hand, bank }
    }

    fn set(&mut self, channel: ChannelId, value: f32) -> String {
        self.bank.set(&mut self.hand, channel, value);
        let status = self.bank.status_line(channel);
        show_status(&status);
        status
    }

    fn labels(&self) -> Vec<String> {
        self.hand
            .world_segments()
            .iter()
            .map(|(id, _)| match id {
                SegmentId::Base => "base".to_string(),
                SegmentId::Palm => "palm".to_string(),
                SegmentId::Mount(kind) => format!("{}-mount", kind.name()),
                SegmentId::Joint(kind, joint) => format!("{}-{}", kind.name(), joint.name()),
            })
            .collect()
    }
}

impl Default for WebHand {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_channel(id: &str) -> Result<ChannelId, JsValue> {
    id.parse().map_err(js_error)
}

fn js_error(err: HandError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Write the readout into the page's `#log` element, if it has one
#[cfg(target_arch = "wasm32")]
fn show_status(text: &str) {
    const STATUS_ELEMENT_ID: &str = "log";

    let element = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(STATUS_ELEMENT_ID));
    if let Some(element) = element {
        element.set_inner_html(text);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn show_status(_text: &str) {}
