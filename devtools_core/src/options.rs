//! Decoding of per-tool option objects handed over by the page.
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::JsValue;

/// Decodes an options object, falling back to the tool defaults when the page
/// passes `null` or `undefined`.
pub fn from_js<T>(value: JsValue) -> Result<T, JsValue>
where
    T: DeserializeOwned + Default,
{
    if value.is_null() || value.is_undefined() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| {
        log::warn!("rejected tool options: {err}");
        JsValue::from_str(&format!("invalid options: {err}"))
    })
}

/// Serializes a tool result for the page. Maps are emitted as plain objects so
/// the front-end can index fields by name.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value
        .serialize(&serializer)
        .map_err(|err| JsValue::from_str(&err.to_string()))
}
