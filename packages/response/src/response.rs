//! # Response Accumulator
//!
//! A `JsonResponse` collects everything a render pass produces and turns it into
//! the structured document sent to the client.
//!
//! ## Buffers
//!
//! - `strings`: text fragments in render order
//! - `labels`: label key → localized text (last write wins)
//! - `inputs`: form field descriptors in render order
//! - `values`: key → rendered value (last write wins)
//! - `loops`: loop key → one nested response per iteration
//!
//! Keyed buffers are `BTreeMap`s so the serialized document is byte-for-byte
//! identical for identical renders.
//!
//! ## Terminal serialization
//!
//! `to_document()` and `response_data()` take `self` by value: once a response
//! has been serialized it cannot be appended to again.

use crate::error::{ResponseError, ResponseResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Attribute mapping describing one rendered form field
pub type InputDescriptor = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonResponse {
    #[serde(default)]
    strings: Vec<String>,
    #[serde(default)]
    labels: BTreeMap<String, String>,
    #[serde(default)]
    inputs: Vec<InputDescriptor>,
    #[serde(default)]
    values: BTreeMap<String, Value>,
    #[serde(default)]
    loops: BTreeMap<String, Vec<JsonResponse>>,
}

impl JsonResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_string(&mut self, text: impl Into<String>) {
        self.strings.push(text.into());
    }

    pub fn append_value(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if let Some(previous) = self.values.insert(key.clone(), value.into()) {
            trace!(key = %key, previous = %previous, "Overwriting value");
        }
    }

    pub fn append_label(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.labels.insert(key.into(), text.into());
    }

    pub fn append_input(&mut self, attributes: InputDescriptor) {
        self.inputs.push(attributes);
    }

    /// Store the per-iteration responses of a loop under `key`.
    pub fn append_loop(&mut self, key: impl Into<String>, sub_responses: Vec<JsonResponse>) {
        let key = key.into();
        debug!(key = %key, iterations = sub_responses.len(), "Appending loop");
        self.loops.insert(key, sub_responses);
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    pub fn inputs(&self) -> &[InputDescriptor] {
        &self.inputs
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn loops(&self) -> &BTreeMap<String, Vec<JsonResponse>> {
        &self.loops
    }

    pub fn loop_iterations(&self, key: &str) -> Option<&[JsonResponse]> {
        self.loops.get(key).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
            && self.labels.is_empty()
            && self.inputs.is_empty()
            && self.values.is_empty()
            && self.loops.is_empty()
    }

    /// Serialize into the wire document.
    pub fn to_document(self) -> ResponseResult<Value> {
        self.validate("")?;
        Ok(serde_json::to_value(&self)?)
    }

    /// Serialize into the encoded payload returned to the client.
    pub fn response_data(self) -> ResponseResult<Vec<u8>> {
        self.validate("")?;
        Ok(serde_json::to_vec(&self)?)
    }

    pub fn to_pretty_string(self) -> ResponseResult<String> {
        self.validate("")?;
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// Keyed buffers must not contain empty keys; the client addresses entries by key.
    fn validate(&self, path: &str) -> ResponseResult<()> {
        if self.labels.contains_key("") {
            return Err(ResponseError::invalid_key("labels", root_path(path)));
        }
        if self.values.contains_key("") {
            return Err(ResponseError::invalid_key("values", root_path(path)));
        }

        for (key, iterations) in &self.loops {
            if key.is_empty() {
                return Err(ResponseError::invalid_key("loops", root_path(path)));
            }
            for (index, sub_response) in iterations.iter().enumerate() {
                sub_response.validate(&format!("{}/loops/{}/{}", path, key, index))?;
            }
        }

        Ok(())
    }
}

fn root_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
