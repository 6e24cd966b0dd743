//! Browser file-save adapter.
//!
//! Wraps a text payload in an object URL and clicks a synthetic anchor,
//! which is the only way a page can hand the user a file.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use chat_types::{ChatError, Result};

pub fn save_text_file(filename: &str, text: &str) -> Result<()> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| ChatError::JsInterop("no document".to_string()))?;

    let parts = js_sys::Array::of1(&JsValue::from_str(text));
    let options = BlobPropertyBag::new();
    options.set_type("text/plain;charset=utf-8");
    let blob = Blob::new_with_str_sequence_and_options(parts.as_ref(), &options)
        .map_err(|e| ChatError::JsInterop(format!("{:?}", e)))?;
    let url = Url::create_object_url_with_blob(&blob)
        .map_err(|e| ChatError::JsInterop(format!("{:?}", e)))?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(|e| ChatError::JsInterop(format!("{:?}", e)))?
        .unchecked_into();
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();
    let _ = Url::revoke_object_url(&url);
    Ok(())
}
