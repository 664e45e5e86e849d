//! Carries per-material texture wrap modes from COLLADA sources into GLB
//! output, either as glTF sampler records or baked into mirrored texture
//! pixels.

pub mod collada;
pub mod config;
pub mod container;
pub mod document;
pub mod error;
pub mod host;
pub mod memory_scene;
pub mod mirror;
pub mod pipeline;
pub mod reconcile;
pub mod uv;
pub mod wrap_mode;
pub mod wrap_table;

pub use container::{parse, serialize, Chunk, Container};
pub use document::{Sampler, SamplerWrap, StructuredScene};
pub use error::{ConfigError, Error, FormatError, LookupError, Result};
pub use host::{MaterialImages, SceneCollaborator};
pub use memory_scene::MemoryScene;
pub use mirror::{mirror_expand, Expansion, RasterBuffer};
pub use pipeline::{condense_wraps, export_with_wraps, reconcile_glb, scale_scene, CondenseReport};
pub use reconcile::{reconcile_samplers, ReconcileOptions, ReconcileReport};
pub use uv::{remap_uv_layers, UvLayer, UvScale};
pub use wrap_mode::{WrapMode, WrapPair};
pub use wrap_table::WrapModeTable;
