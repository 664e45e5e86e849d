//! A scene held entirely in memory. Drives the pipelines without a live 3D
//! application, and backs the tests.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::container::{self, Chunk, Container};
use crate::document::StructuredScene;
use crate::error::{BoxError, FormatError, LookupError};
use crate::host::{MaterialImages, ObjectKind, SceneCollaborator, SceneObject};
use crate::mirror::RasterBuffer;
use crate::uv::UvLayer;

#[derive(Debug, Clone)]
struct MemoryObject {
    name: String,
    kind: ObjectKind,
    active_material: Option<String>,
    scale: Vec3,
    uv_layers: Vec<UvLayer>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    objects: Vec<MemoryObject>,
    materials: BTreeMap<String, Vec<String>>,
    images: BTreeMap<String, RasterBuffer>,
    export: Option<Vec<u8>>,
    exports: usize,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(
        &mut self,
        name: impl Into<String>,
        material: Option<&str>,
        uv_layers: Vec<UvLayer>,
    ) -> &mut Self {
        self.objects.push(MemoryObject {
            name: name.into(),
            kind: ObjectKind::Mesh,
            active_material: material.map(str::to_string),
            scale: Vec3::ONE,
            uv_layers,
        });
        self
    }

    /// Adds a non-mesh object such as a light or an empty.
    pub fn add_other(&mut self, name: impl Into<String>) -> &mut Self {
        self.objects.push(MemoryObject {
            name: name.into(),
            kind: ObjectKind::Other,
            active_material: None,
            scale: Vec3::ONE,
            uv_layers: vec![],
        });
        self
    }

    pub fn add_material<I, S>(&mut self, name: impl Into<String>, images: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.materials
            .insert(name.into(), images.into_iter().map(Into::into).collect());
        self
    }

    pub fn add_image(&mut self, name: impl Into<String>, image: RasterBuffer) -> &mut Self {
        self.images.insert(name.into(), image);
        self
    }

    /// Bytes returned by every later export.
    pub fn set_export(&mut self, bytes: Vec<u8>) -> &mut Self {
        self.export = Some(bytes);
        self
    }

    /// Exports `document` as a GLB with an optional BIN payload.
    pub fn set_export_document(
        &mut self,
        document: &StructuredScene,
        bin: Option<Vec<u8>>,
    ) -> Result<&mut Self, FormatError> {
        let mut chunks = vec![Chunk::new(container::CHUNK_JSON, vec![])];
        chunks.extend(bin.map(|data| Chunk::new(container::CHUNK_BIN, data)));
        let bytes = container::serialize(document, &Container::new(chunks))?;
        Ok(self.set_export(bytes))
    }

    /// How many times the export operation ran.
    pub fn export_count(&self) -> usize {
        self.exports
    }

    pub fn uv_layers(&self, object: &str) -> Option<&[UvLayer]> {
        self.object(object).map(|o| o.uv_layers.as_slice())
    }

    fn object(&self, name: &str) -> Option<&MemoryObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    fn object_mut(&mut self, name: &str) -> Option<&mut MemoryObject> {
        self.objects.iter_mut().find(|o| o.name == name)
    }
}

impl MaterialImages for MemoryScene {
    fn material_image_names(&self, material: &str) -> Option<Vec<String>> {
        self.materials.get(material).cloned()
    }
}

impl SceneCollaborator for MemoryScene {
    fn objects(&self) -> Vec<SceneObject> {
        self.objects
            .iter()
            .map(|o| SceneObject {
                name: o.name.clone(),
                kind: o.kind,
                active_material: o.active_material.clone(),
            })
            .collect()
    }

    fn scale(&self, object: &str) -> Option<Vec3> {
        self.object(object).map(|o| o.scale)
    }

    fn set_scale(&mut self, object: &str, scale: Vec3) -> Result<(), LookupError> {
        let target = self
            .object_mut(object)
            .ok_or_else(|| LookupError::ObjectMissing(object.to_string()))?;
        target.scale = scale;
        Ok(())
    }

    fn image(&self, name: &str) -> Option<&RasterBuffer> {
        self.images.get(name)
    }

    fn replace_image(&mut self, name: &str, image: RasterBuffer) -> Result<(), LookupError> {
        let slot = self
            .images
            .get_mut(name)
            .ok_or_else(|| LookupError::ImageMissing(name.to_string()))?;
        *slot = image;
        Ok(())
    }

    fn uv_layers_mut(&mut self, object: &str) -> Option<&mut [UvLayer]> {
        self.object_mut(object).map(|o| o.uv_layers.as_mut_slice())
    }

    fn export_container(&mut self) -> Result<Vec<u8>, BoxError> {
        self.exports += 1;
        self.export
            .clone()
            .ok_or_else(|| "scene has no export configured".into())
    }
}
