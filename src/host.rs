//! Capabilities the core needs from the 3D application holding the scene.

use std::collections::{BTreeSet, HashMap};

use glam::Vec3;

use crate::document::StructuredScene;
use crate::error::{BoxError, LookupError};
use crate::mirror::RasterBuffer;
use crate::uv::UvLayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Mesh,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub active_material: Option<String>,
}

/// Strips a trailing file extension the way image names carry them
/// (`rock.png` -> `rock`). Leading dots do not start an extension.
pub fn strip_extension(name: &str) -> &str {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(dot) => &name[..leading + dot],
        None => name,
    }
}

/// Image lookup by material, the only thing sampler reconciliation needs.
pub trait MaterialImages {
    /// Names of the images the material's shader graph samples, `None` when
    /// the material is unknown.
    fn material_image_names(&self, material: &str) -> Option<Vec<String>>;

    fn image_base_names(&self, material: &str) -> Option<BTreeSet<String>> {
        let names = self.material_image_names(material)?;
        Some(
            names
                .iter()
                .map(|n| strip_extension(n).to_string())
                .collect(),
        )
    }
}

impl MaterialImages for HashMap<String, Vec<String>> {
    fn material_image_names(&self, material: &str) -> Option<Vec<String>> {
        self.get(material).cloned()
    }
}

/// Read/write access to the live scene for the pixel-bake path.
pub trait SceneCollaborator: MaterialImages {
    fn objects(&self) -> Vec<SceneObject>;

    fn scale(&self, object: &str) -> Option<Vec3>;

    fn set_scale(&mut self, object: &str, scale: Vec3) -> Result<(), LookupError>;

    fn image(&self, name: &str) -> Option<&RasterBuffer>;

    /// Replaces the pixels of `name`, keeping its name and every reference to it.
    fn replace_image(&mut self, name: &str, image: RasterBuffer) -> Result<(), LookupError>;

    fn uv_layers_mut(&mut self, object: &str) -> Option<&mut [UvLayer]>;

    /// The application's own "export scene as GLB" operation.
    fn export_container(&mut self) -> Result<Vec<u8>, BoxError>;
}

/// Material images resolved from the JSON document itself, for when no live
/// scene is available. Follows material texture references to image names.
#[derive(Debug, Clone, Default)]
pub struct DocumentMaterialImages {
    materials: Vec<(String, Vec<String>)>,
}

impl DocumentMaterialImages {
    pub fn new(scene: &StructuredScene) -> Self {
        let mut materials = vec![];
        for material in &scene.materials {
            let Some(name) = &material.name else {
                continue;
            };
            let images = scene
                .material_texture_indices(material)
                .into_iter()
                .filter_map(|i| scene.textures.get(i))
                .filter_map(|t| scene.texture_image_name(t))
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect();
            materials.push((name.clone(), images));
        }
        Self { materials }
    }
}

impl MaterialImages for DocumentMaterialImages {
    fn material_image_names(&self, material: &str) -> Option<Vec<String>> {
        self.materials
            .iter()
            .find(|(name, _)| name == material)
            .map(|(_, images)| images.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_extensions() {
        assert_eq!(strip_extension("rock.png"), "rock");
        assert_eq!(strip_extension("rock.tar.gz"), "rock.tar");
        assert_eq!(strip_extension("rock"), "rock");
        assert_eq!(strip_extension(".hidden"), ".hidden");
        assert_eq!(strip_extension("..x.png"), "..x");
        assert_eq!(strip_extension(""), "");
    }

    #[test]
    fn resolves_images_from_document() {
        let scene: StructuredScene = serde_json::from_value(json!({
            "materials": [
                { "name": "Rock", "pbrMetallicRoughness": { "baseColorTexture": { "index": 1 } } },
                { "name": "Bare" },
                { "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } } }
            ],
            "textures": [{ "source": 0 }, { "source": 1 }],
            "images": [{ "name": "grass" }, { "name": "rock_alb.png" }]
        }))
        .unwrap();
        let images = DocumentMaterialImages::new(&scene);
        assert_eq!(
            images.material_image_names("Rock"),
            Some(vec!["rock_alb.png".to_string()])
        );
        assert_eq!(
            images.image_base_names("Rock"),
            Some(BTreeSet::from(["rock_alb".to_string()]))
        );
        assert_eq!(images.material_image_names("Bare"), Some(vec![]));
        assert_eq!(images.material_image_names("Missing"), None);
    }
}
