use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_repr::{Deserialize_repr, Serialize_repr};

#[derive(Serialize_repr, Deserialize_repr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum SamplerWrap {
    ClampToEdge = 33071,
    MirroredRepeat = 33648,
    Repeat = 10497,
}

#[derive(Serialize_repr, Deserialize_repr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum MagFilter {
    Nearest = 9728,
    Linear = 9729,
}

#[derive(Serialize_repr, Deserialize_repr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum MinFilter {
    Nearest = 9728,
    Linear = 9729,
    NearestMipmapNearest = 9984,
    LinearMipmapNearest = 9985,
    NearestMipmapLinear = 9986,
    LinearMipmapLinear = 9987,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Material {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Texture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampler: Option<usize>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Sampler {
    #[serde(rename = "wrapS", default, skip_serializing_if = "Option::is_none")]
    pub wrap_s: Option<SamplerWrap>,
    #[serde(rename = "wrapT", default, skip_serializing_if = "Option::is_none")]
    pub wrap_t: Option<SamplerWrap>,
    #[serde(rename = "magFilter", default, skip_serializing_if = "Option::is_none")]
    pub mag_filter: Option<MagFilter>,
    #[serde(rename = "minFilter", default, skip_serializing_if = "Option::is_none")]
    pub min_filter: Option<MinFilter>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Sampler {
    /// Effective wrap pair; an absent wrap means REPEAT.
    pub fn wraps(&self) -> (SamplerWrap, SamplerWrap) {
        (
            self.wrap_s.unwrap_or(SamplerWrap::Repeat),
            self.wrap_t.unwrap_or(SamplerWrap::Repeat),
        )
    }

    /// New sampler with the given wraps, inheriting filters from `template`
    /// and defaulting each missing filter to LINEAR / LINEAR_MIPMAP_LINEAR.
    pub fn with_wraps(wraps: (SamplerWrap, SamplerWrap), template: Option<&Sampler>) -> Self {
        Self {
            wrap_s: Some(wraps.0),
            wrap_t: Some(wraps.1),
            mag_filter: Some(
                template
                    .and_then(|s| s.mag_filter)
                    .unwrap_or(MagFilter::Linear),
            ),
            min_filter: Some(
                template
                    .and_then(|s| s.min_filter)
                    .unwrap_or(MinFilter::LinearMipmapLinear),
            ),
            extra: Map::new(),
        }
    }
}

/// The JSON chunk of a container. Only the lists touched by sampler
/// reconciliation are typed; every other field is carried through verbatim.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct StructuredScene {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<Material>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub textures: Vec<Texture>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samplers: Vec<Sampler>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl StructuredScene {
    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials
            .iter()
            .find(|m| m.name.as_deref() == Some(name))
    }

    /// Trimmed name of the image a texture samples from.
    pub fn texture_image_name(&self, texture: &Texture) -> Option<&str> {
        let source = texture.source?;
        let image = self.images.get(source)?;
        Some(image.name.as_deref().unwrap_or("").trim())
    }

    /// Texture indices referenced by a material's texture-info objects
    /// (`baseColorTexture`, `normalTexture`, extension textures, ...).
    pub fn material_texture_indices(&self, material: &Material) -> Vec<usize> {
        let mut indices = vec![];
        for (key, value) in &material.extra {
            collect_texture_indices(key, value, &mut indices);
        }
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

fn collect_texture_indices(key: &str, value: &Value, out: &mut Vec<usize>) {
    match value {
        Value::Object(fields) => {
            if key.ends_with("Texture") {
                if let Some(index) = fields.get("index").and_then(Value::as_u64) {
                    out.push(index as usize);
                }
            }
            for (k, v) in fields {
                collect_texture_indices(k, v, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_texture_indices(key, item, out);
            }
        }
        _ => {}
    }
}
