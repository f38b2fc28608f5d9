// src/scanner.rs
use js_sys::{Function, Promise};
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use yew::Callback;

use crate::config::ScannerSettings;

// html5-qrcode, loaded by index.html.
#[wasm_bindgen]
extern "C" {
    pub type Html5Qrcode;

    #[wasm_bindgen(constructor, catch)]
    fn new(element_id: &str) -> Result<Html5Qrcode, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn start(
        this: &Html5Qrcode,
        camera: &JsValue,
        config: &JsValue,
        on_success: &Function,
    ) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn stop(this: &Html5Qrcode) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn clear(this: &Html5Qrcode) -> Result<(), JsValue>;

    #[wasm_bindgen(method, getter, js_name = isScanning)]
    fn is_scanning(this: &Html5Qrcode) -> bool;
}

/// Camera capture bound to the modal's mount element. The library instance is created on
/// first start and reused afterwards.
pub struct ScanController {
    settings: ScannerSettings,
    instance: Option<Html5Qrcode>,
    on_decoded: Closure<dyn FnMut(String)>,
}

impl ScanController {
    pub fn new(settings: ScannerSettings, on_decoded: Callback<String>) -> Self {
        let on_decoded = Closure::wrap(Box::new(move |text: String| {
            on_decoded.emit(text);
        }) as Box<dyn FnMut(String)>);
        Self {
            settings,
            instance: None,
            on_decoded,
        }
    }

    pub fn start(&mut self) -> Result<Promise, JsValue> {
        let camera = serde_wasm_bindgen::to_value(&self.settings.camera())?;
        let config = serde_wasm_bindgen::to_value(&self.settings.scan_config())?;

        if self.instance.is_none() {
            debug!("binding scanner to #{}", self.settings.mount_id);
            self.instance = Some(Html5Qrcode::new(&self.settings.mount_id)?);
        }
        let Some(instance) = self.instance.as_ref() else {
            return Err(JsValue::from_str("scanner unavailable"));
        };
        instance.start(&camera, &config, self.on_decoded.as_ref().unchecked_ref())
    }

    /// `None` when there is nothing to stop.
    pub fn stop(&self) -> Option<Promise> {
        let instance = self.instance.as_ref().filter(|i| i.is_scanning())?;
        match instance.stop() {
            Ok(promise) => Some(promise),
            Err(err) => {
                warn!("scanner refused to stop: {:?}", err);
                None
            }
        }
    }

    /// Releases the library's video element. Failure is logged and ignored.
    pub fn clear(&self) {
        if let Some(instance) = &self.instance {
            if let Err(err) = instance.clear() {
                warn!("could not clear scanner: {:?}", err);
            }
        }
    }
}
