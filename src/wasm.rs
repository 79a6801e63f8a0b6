//! WebAssembly bindings for vscii

use wasm_bindgen::prelude::*;
use crate::{convert_rgba, render_frame, AnimationStyle, CharacterGrid, ConversionSettings, VsciiError};

fn to_js(err: VsciiError) -> JsValue {
    let msg = err.to_string();
    web_sys::console::error_1(&JsValue::from_str(&msg));
    JsValue::from_str(&msg)
}

#[wasm_bindgen]
pub struct WasmConverter {
    settings: ConversionSettings,
    last: Option<CharacterGrid>,
}

#[wasm_bindgen]
impl WasmConverter {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmConverter {
        WasmConverter { settings: ConversionSettings::default(), last: None }
    }

    /// Replace the settings from a JSON object; missing fields take defaults.
    #[wasm_bindgen]
    pub fn set_settings(&mut self, json: &str) -> Result<(), JsValue> {
        let settings: ConversionSettings =
            serde_json::from_str(json).map_err(|e| to_js(e.into()))?;
        settings.validate().map_err(to_js)?;
        self.settings = settings;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.settings.output_width = width;
        self.settings.output_height = height;
    }

    /// Convert an RGBA buffer and return the text block.
    ///
    /// On failure the previously converted grid is kept for `frame`.
    #[wasm_bindgen]
    pub fn convert(&mut self, image_data: &[u8], width: u32, height: u32) -> Result<String, JsValue> {
        let grid = convert_rgba(width, height, image_data, &self.settings).map_err(to_js)?;
        let text = grid.to_text_with_annotation(self.settings.annotation.as_deref());
        self.last = Some(grid);
        Ok(text)
    }

    /// Animated text of the last converted grid at `elapsed_ms`.
    #[wasm_bindgen]
    pub fn frame(&self, elapsed_ms: f64, style: &str) -> Result<String, JsValue> {
        let style: AnimationStyle = style.parse().map_err(to_js)?;
        let grid = self
            .last
            .as_ref()
            .ok_or_else(|| to_js(VsciiError::InvalidInput("nothing converted yet".into())))?;
        Ok(render_frame(grid, style, elapsed_ms).to_text())
    }

    /// Output size of the last conversion as `[width, height]`.
    #[wasm_bindgen]
    pub fn output_size(&self) -> js_sys::Uint32Array {
        let (w, h) = self
            .last
            .as_ref()
            .map_or((0, 0), |g| (g.width() as u32, g.height() as u32));
        js_sys::Uint32Array::from(&[w, h][..])
    }
}

impl Default for WasmConverter {
    fn default() -> Self {
        Self::new()
    }
}
