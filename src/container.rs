//! Reader and writer for the binary glTF (GLB) container.
//!
//! A container is a 12 byte header followed by length-prefixed chunks:
//!
//! ```text
//! magic u32 | version u32 | total length u32
//! chunk length u32 | chunk type u32 | payload ...   (repeated)
//! ```
//!
//! All integers are little-endian. Only the JSON chunk is ever decoded, the
//! rest are carried as opaque bytes.

use std::fmt;

use crate::document::StructuredScene;
use crate::error::FormatError;

pub const GLB_MAGIC: u32 = 0x46546C67; // "glTF"
pub const GLB_VERSION: u32 = 2;
pub const CHUNK_JSON: u32 = 0x4E4F534A; // "JSON"
pub const CHUNK_BIN: u32 = 0x004E4942; // "BIN\0"

pub const HEADER_SIZE: usize = 12;
pub const CHUNK_HEADER_SIZE: usize = 8;

fn read_u32(buffer: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buffer[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

fn tag_to_ascii(tag: u32) -> String {
    tag.to_le_bytes()
        .iter()
        .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub chunk_type: u32,
    pub data: Vec<u8>,
}

impl Chunk {
    pub fn new(chunk_type: u32, data: Vec<u8>) -> Self {
        Self { chunk_type, data }
    }

    pub fn is_json(&self) -> bool {
        self.chunk_type == CHUNK_JSON
    }

    pub fn is_bin(&self) -> bool {
        self.chunk_type == CHUNK_BIN
    }

    /// Payload byte count as written in the chunk header.
    pub fn length(&self) -> usize {
        self.data.len()
    }
}

/// Ordered chunks of a parsed container. Chunk lengths and the total length
/// are derived from the payloads, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub version: u32,
    pub chunks: Vec<Chunk>,
}

impl Container {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self {
            version: GLB_VERSION,
            chunks,
        }
    }

    /// Length field of the container header.
    pub fn total_length(&self) -> usize {
        HEADER_SIZE
            + self
                .chunks
                .iter()
                .map(|c| CHUNK_HEADER_SIZE + c.length())
                .sum::<usize>()
    }

    pub fn json_chunk(&self) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.is_json())
    }

    pub fn bin_chunk(&self) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.is_bin())
    }

    /// Splits a byte stream into chunks without decoding any of them.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < HEADER_SIZE {
            return Err(FormatError::HeaderTooShort(bytes.len()));
        }
        let magic = read_u32(bytes, 0);
        if magic != GLB_MAGIC {
            return Err(FormatError::BadMagic(magic));
        }
        let version = read_u32(bytes, 4);
        if version != GLB_VERSION {
            log::warn!("unexpected container version {}, continuing", version);
        }
        let declared = read_u32(bytes, 8);
        let length = declared as usize;
        if length < HEADER_SIZE || length > bytes.len() {
            return Err(FormatError::LengthOutOfRange {
                declared,
                available: bytes.len(),
            });
        }
        if bytes.len() > length {
            log::debug!(
                "ignoring {} trailing bytes after the declared container length",
                bytes.len() - length
            );
        }

        let mut chunks = vec![];
        let mut offset = HEADER_SIZE;
        while offset < length {
            let index = chunks.len();
            if offset + CHUNK_HEADER_SIZE > length {
                return Err(FormatError::ChunkHeaderOverrun {
                    index,
                    offset,
                    declared: length,
                });
            }
            let chunk_length = read_u32(bytes, offset);
            let chunk_type = read_u32(bytes, offset + 4);
            let start = offset + CHUNK_HEADER_SIZE;
            let remaining = length - start;
            if chunk_length as usize > remaining {
                return Err(FormatError::ChunkOverrun {
                    index,
                    offset,
                    length: chunk_length,
                    remaining,
                });
            }
            let end = start + chunk_length as usize;
            chunks.push(Chunk::new(chunk_type, bytes[start..end].to_vec()));
            offset = end;
        }

        Ok(Self { version, chunks })
    }

    /// Writes the header and chunks in order, recomputing every length field.
    pub fn to_vec(&self) -> Result<Vec<u8>, FormatError> {
        write_chunks(self.version, self.chunks.iter().map(|c| (c.chunk_type, &c.data[..])))
    }
}

fn write_chunks<'a, I>(version: u32, chunks: I) -> Result<Vec<u8>, FormatError>
where
    I: Iterator<Item = (u32, &'a [u8])> + Clone,
{
    let total = HEADER_SIZE
        + chunks
            .clone()
            .map(|(_, data)| CHUNK_HEADER_SIZE + data.len())
            .sum::<usize>();
    let total_u32 = u32::try_from(total).map_err(|_| FormatError::TooLarge(total))?;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&version.to_le_bytes());
    out.extend_from_slice(&total_u32.to_le_bytes());
    for (chunk_type, data) in chunks {
        // fits, the total did
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&chunk_type.to_le_bytes());
        out.extend_from_slice(data);
    }
    Ok(out)
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "magic: glTF, version: {}, length: {}",
            self.version,
            self.total_length()
        )?;
        for (i, chunk) in self.chunks.iter().enumerate() {
            writeln!(
                f,
                "chunk {} | type: {} (0x{:08X}), length: {}",
                i,
                tag_to_ascii(chunk.chunk_type),
                chunk.chunk_type,
                chunk.length()
            )?;
        }
        Ok(())
    }
}

/// Parses a container and decodes its first JSON chunk.
pub fn parse(bytes: &[u8]) -> Result<(StructuredScene, Container), FormatError> {
    let container = Container::from_slice(bytes)?;
    let json = container.json_chunk().ok_or(FormatError::MissingJsonChunk)?;
    let scene = serde_json::from_slice(&json.data)?;
    Ok((scene, container))
}

/// Encodes `scene` into the first JSON chunk of `container` and writes the
/// whole container. The chunk is space padded to a 4 byte boundary.
pub fn serialize(scene: &StructuredScene, container: &Container) -> Result<Vec<u8>, FormatError> {
    let mut json = serde_json::to_vec(scene)?;
    while json.len() % 4 != 0 {
        json.push(b' ');
    }

    let json_index = container
        .chunks
        .iter()
        .position(|c| c.is_json())
        .ok_or(FormatError::MissingJsonChunk)?;
    let chunks = container.chunks.iter().enumerate().map(|(i, c)| {
        if i == json_index {
            (c.chunk_type, &json[..])
        } else {
            (c.chunk_type, &c.data[..])
        }
    });
    write_chunks(container.version, chunks)
}
