use std::fmt;

#[derive(Debug)]
pub enum RecordError {
    /// The engine was driven out of order (start while recording, finish
    /// while idle). Indicates a caller-side logic bug.
    InvalidOperation(String),
    EncodingError(String),
    MuxingError(String),
    IoError(String),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordError::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
            RecordError::EncodingError(msg) => write!(f, "Encoding error: {}", msg),
            RecordError::MuxingError(msg) => write!(f, "Muxing error: {}", msg),
            RecordError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for RecordError {}

impl From<std::io::Error> for RecordError {
    fn from(err: std::io::Error) -> Self {
        RecordError::IoError(err.to_string())
    }
}
