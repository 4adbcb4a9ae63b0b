//! Errors raised while mounting a surface into the page.

use thiserror::Error;

/// Mount errors.
#[derive(Debug, Error)]
pub enum MountError {
    #[error("Invalid mount configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Browser API error: {0}")]
    Js(String),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for MountError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        MountError::Js(format!("{:?}", value))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<MountError> for wasm_bindgen::JsValue {
    fn from(error: MountError) -> Self {
        wasm_bindgen::JsValue::from_str(&error.to_string())
    }
}
