use thiserror::Error;

/// I/O errors that can occur when fetching originals from remote storage
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Error from S3 or S3-compatible storage
    #[error("S3 error: {0}")]
    S3(String),

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Object not found
    #[error("Object not found: {0}")]
    NotFound(String),
}

/// Errors produced when parsing a `"<width>x<height>"` size spec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeError {
    /// The string is not two non-empty parts separated by a single `x`
    #[error("Invalid size format: {0:?} (expected \"<width>x<height>\")")]
    InvalidFormat(String),

    /// One side is not a non-negative integer that fits in `u32`
    #[error("Invalid dimension: {0:?}")]
    InvalidDimension(String),
}

/// Errors produced while resolving a request path into a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Path does not have the `/{alias}/{assortment}/{key...}/{size}.{ext}` shape
    #[error("Malformed path: {0}")]
    MalformedPath(String),

    #[error("Unknown bucket alias: {0}")]
    UnknownBucketAlias(String),

    #[error("Unknown assortment: {0}")]
    UnknownAssortment(String),

    #[error("Unknown size {size:?} in assortment {assortment:?}")]
    UnknownSizeName { assortment: String, size: String },

    /// The catalog entry for this size could not be parsed
    #[error("Invalid size spec: {0}")]
    InvalidSizeSpec(#[from] SizeError),

    /// Extension is not one of jpg, jpeg or png
    #[error("Unsupported extension: {0}")]
    UnsupportedExtension(String),
}

/// Errors from the nearest-neighbor resize engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResizeError {
    /// Source image has a zero width or height, so its aspect ratio is undefined
    #[error("Source image is empty ({width}x{height})")]
    EmptySource { width: u32, height: u32 },

    /// Aspect-ratio inference produced a zero-sized target
    #[error("Resize target collapses to {width}x{height}")]
    EmptyTarget { width: u32, height: u32 },

    /// Target does not fit in `u32` per side or exceeds the pixel budget
    #[error("Resize target {width}x{height} is too large")]
    TargetTooLarge { width: u64, height: u64 },
}

/// Errors from decoding or encoding image bytes
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Errors from persisting cache entries to disk
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from loading the YAML configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Coarse error classification used by the transport layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    UpstreamError,
    DecodeError,
    EncodeError,
}

/// Errors that terminate a request in the resize pipeline
#[derive(Debug, Error)]
pub enum ServeError {
    /// The request path did not resolve against the catalog
    #[error(transparent)]
    BadRequest(#[from] ResolveError),

    /// Fetching the original failed
    #[error(transparent)]
    Fetch(#[from] IoError),

    /// The original could not be decoded or resized
    #[error("Failed to decode image: {message}")]
    DecodeError { message: String },

    /// The resized image could not be encoded
    #[error("Failed to encode image: {message}")]
    EncodeError { message: String },
}

impl ServeError {
    /// Classify this error for the transport layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServeError::BadRequest(_) => ErrorKind::BadRequest,
            ServeError::Fetch(IoError::NotFound(_)) => ErrorKind::NotFound,
            ServeError::Fetch(_) => ErrorKind::UpstreamError,
            ServeError::DecodeError { .. } => ErrorKind::DecodeError,
            ServeError::EncodeError { .. } => ErrorKind::EncodeError,
        }
    }
}

impl From<CodecError> for ServeError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Decode(message) => ServeError::DecodeError { message },
            CodecError::Encode(message) => ServeError::EncodeError { message },
        }
    }
}

impl From<ResizeError> for ServeError {
    fn from(err: ResizeError) -> Self {
        ServeError::DecodeError {
            message: err.to_string(),
        }
    }
}
