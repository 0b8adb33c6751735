use thiserror::Error;

/// Errors that can occur during Terrascope initialization.
#[derive(Debug, Error)]
pub enum TerrascopeError {
    #[error("WebGPU adapter not found: {0}")]
    AdapterNotFound(String),

    #[error("Failed to request GPU device: {0}")]
    DeviceRequestFailed(String),

    #[error("Surface configuration failed: {0}")]
    SurfaceConfigFailed(String),

    #[error("Canvas element not found: {0}")]
    CanvasNotFound(String),

    #[error("Scene configuration invalid: {0}")]
    Config(#[from] ConfigError),
}

/// A color string that is not `#rgb` or `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color '{0}'")]
pub struct ColorParseError(pub String);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse scene config RON: {0}")]
    ParseError(String),
}

/// Errors raised while turning a content-service response into typed records.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content response is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("content response is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("content request failed: {0}")]
    RequestFailed(String),
}
