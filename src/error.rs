use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Malformed or truncated GLB container.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("container is {0} bytes, smaller than the 12 byte header")]
    HeaderTooShort(usize),

    #[error("invalid magic 0x{0:08X}, expected 0x46546C67 (\"glTF\")")]
    BadMagic(u32),

    #[error("declared length {declared} is out of range for a {available} byte input")]
    LengthOutOfRange { declared: u32, available: usize },

    #[error("chunk {index} header at offset {offset} runs past the declared length {declared}")]
    ChunkHeaderOverrun { index: usize, offset: usize, declared: usize },

    #[error("chunk {index} at offset {offset} declares {length} payload bytes but only {remaining} remain")]
    ChunkOverrun {
        index: usize,
        offset: usize,
        length: u32,
        remaining: usize,
    },

    #[error("no JSON chunk found in container")]
    MissingJsonChunk,

    #[error("JSON chunk could not be decoded: {0}")]
    Json(#[from] serde_json::Error),

    #[error("encoded JSON chunk is {0} bytes, too large for a u32 length field")]
    TooLarge(usize),
}

/// Missing or invalid path settings, reported before any processing starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is required")]
    MissingPath(&'static str),

    #[error("{what} does not exist: {}", .path.display())]
    NotFound { what: &'static str, path: PathBuf },

    #[error("output directory does not exist: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
}

/// An entry that could not be matched between the wrap table, the document
/// and the host scene. Never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("material '{0}' is not present in the host scene")]
    MaterialNotInHost(String),

    #[error("material '{0}' from the wrap table is not present in the document")]
    MaterialNotInDocument(String),

    #[error("object '{0}' is not present in the host scene")]
    ObjectMissing(String),

    #[error("image '{0}' is not present in the host scene")]
    ImageMissing(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("host export failed: {0}")]
    Export(#[source] BoxError),
}

pub type Result<T> = std::result::Result<T, Error>;
