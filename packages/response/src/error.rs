use thiserror::Error;

pub type ResponseResult<T> = Result<T, ResponseError>;

#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Empty key in '{buffer}' at {path}")]
    InvalidKey { buffer: &'static str, path: String },
}

impl ResponseError {
    pub fn invalid_key(buffer: &'static str, path: impl Into<String>) -> Self {
        Self::InvalidKey {
            buffer,
            path: path.into(),
        }
    }
}
