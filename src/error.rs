pub type FlagResult<T> = Result<T, FlagError>;

#[derive(thiserror::Error, Debug)]
pub enum FlagError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("text metrics unavailable: {0}")]
    MetricsUnavailable(String),

    #[error("logo decode error: {0}")]
    LogoDecode(String),

    #[error("geometry too small: {0}")]
    GeometryTooSmall(String),

    #[error("canvas clipping: {0}")]
    CanvasClipping(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlagError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn metrics(msg: impl Into<String>) -> Self {
        Self::MetricsUnavailable(msg.into())
    }

    pub fn logo_decode(msg: impl Into<String>) -> Self {
        Self::LogoDecode(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::GeometryTooSmall(msg.into())
    }

    pub fn clipping(msg: impl Into<String>) -> Self {
        Self::CanvasClipping(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
