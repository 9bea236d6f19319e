use lector::{Device, Dtype};

/// Model checkpoint loaded when no other is configured.
pub const DEFAULT_MODEL_ID: &str = "onnx-community/Kokoro-82M-v1.0-ONNX";

/// Capacity of each worker's command queue.
///
/// A pool round only ever has one request in flight per worker, so this only
/// matters when several callers share a [`Session`](crate::Session)
/// directly.
pub const DEFAULT_REQUEST_BUFFER_SIZE: usize = 16;

/// Settings handed to every worker's [`Loader`](crate::Loader).
///
/// The pool never interprets these beyond `request_buffer_size`; they are
/// passed through to the backend as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub model_id: String,
    pub dtype: Dtype,
    pub device: Device,
    pub request_buffer_size: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_owned(),
            dtype: Dtype::default(),
            device: Device::default(),
            request_buffer_size: DEFAULT_REQUEST_BUFFER_SIZE,
        }
    }
}
