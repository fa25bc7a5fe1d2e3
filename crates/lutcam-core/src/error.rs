use std::io;

/// Errors produced by the grading pipeline.
///
/// Every variant leaves shared state (the filter registry) untouched and
/// caller-owned output buffers unwritten.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    #[error("invalid buffer: {0}")]
    InvalidBuffer(String),
    #[error("invalid frame dimensions {width}x{height}: must be non-zero and even")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("out of memory allocating {bytes} bytes")]
    OutOfMemory { bytes: usize },
    #[error("unknown filter: {0}")]
    UnknownFilter(String),
    #[error("invalid LUT: {0}")]
    InvalidLut(String),
    #[error(".cube parse error on line {line}: {message}")]
    CubeParse { line: usize, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl GradeError {
    pub(crate) fn invalid_buffer(message: impl Into<String>) -> Self {
        Self::InvalidBuffer(message.into())
    }

    pub(crate) fn cube_parse(line: usize, message: impl Into<String>) -> Self {
        Self::CubeParse {
            line,
            message: message.into(),
        }
    }
}
