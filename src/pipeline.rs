//! The end-to-end operations run against a host scene.
//!
//! [`export_with_wraps`] keeps wrap modes as sampler metadata in the exported
//! GLB. [`condense_wraps`] bakes mirrored wraps into texture pixels instead,
//! for renderers that only clamp.

use std::collections::{HashMap, HashSet};

use crate::container;
use crate::error::{Error, LookupError, Result};
use crate::host::{DocumentMaterialImages, MaterialImages, ObjectKind, SceneCollaborator, SceneObject};
use crate::mirror::{mirror_expand, Expansion};
use crate::reconcile::{reconcile_samplers, ReconcileOptions, ReconcileReport};
use crate::uv::{remap_uv_layers, UvScale};
use crate::wrap_table::WrapModeTable;

/// Exports the host scene and rewrites its samplers. Returns the GLB bytes for
/// the caller to write out.
pub fn export_with_wraps<H: SceneCollaborator>(
    host: &mut H,
    table: &WrapModeTable,
    options: ReconcileOptions,
) -> Result<(Vec<u8>, ReconcileReport)> {
    let exported = host.export_container().map_err(Error::Export)?;
    log::debug!("host exported {} bytes", exported.len());
    reconcile_glb(&exported, table, Some(&*host as &dyn MaterialImages), options)
}

/// Reconciles the samplers of an already exported GLB. Without a host, material
/// images are looked up through the document's own texture references.
pub fn reconcile_glb(
    glb: &[u8],
    table: &WrapModeTable,
    host: Option<&dyn MaterialImages>,
    options: ReconcileOptions,
) -> Result<(Vec<u8>, ReconcileReport)> {
    let (mut scene, container) = container::parse(glb)?;
    let report = match host {
        Some(host) => reconcile_samplers(&mut scene, table, host, options),
        None => {
            let images = DocumentMaterialImages::new(&scene);
            reconcile_samplers(&mut scene, table, &images, options)
        }
    };
    let bytes = container::serialize(&scene, &container)?;
    Ok((bytes, report))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CondenseReport {
    pub images_expanded: usize,
    /// Images already expanded for an earlier material and left alone.
    pub images_shared: usize,
    pub objects_remapped: usize,
    pub uv_layers_remapped: usize,
    pub skipped: Vec<LookupError>,
}

/// Doubles every mirrored texture in place in the host and rescales the UVs of
/// the meshes using it. Materials no mesh uses are left alone. Each image is
/// expanded at most once and each object remapped at most once.
pub fn condense_wraps<H: SceneCollaborator>(host: &mut H, table: &WrapModeTable) -> CondenseReport {
    let mut report = CondenseReport::default();
    let objects = host.objects();
    let mut expanded: HashMap<String, UvScale> = HashMap::new();
    let mut remapped: HashSet<String> = HashSet::new();

    for (material, wraps) in table.iter() {
        if !wraps.needs_mirroring() {
            continue;
        }
        let Some(image_names) = host.material_image_names(material) else {
            log::warn!("material '{}' not found in the host scene, skipping", material);
            report
                .skipped
                .push(LookupError::MaterialNotInHost(material.to_string()));
            continue;
        };
        let users: Vec<&SceneObject> = objects
            .iter()
            .filter(|o| o.kind == ObjectKind::Mesh && o.active_material.as_deref() == Some(material))
            .collect();
        if users.is_empty() {
            log::debug!("no mesh uses material '{}', leaving its images alone", material);
            continue;
        }

        let mut material_scale = None;
        for name in image_names {
            if let Some(&scale) = expanded.get(&name) {
                log::debug!("image '{}' already expanded", name);
                report.images_shared += 1;
                material_scale.get_or_insert(scale);
                continue;
            }
            let Some(image) = host.image(&name) else {
                log::warn!("image '{}' of material '{}' is missing", name, material);
                report.skipped.push(LookupError::ImageMissing(name));
                continue;
            };

            let expansion = mirror_expand(image, wraps);
            let scale = UvScale::from_expansion(&expansion);
            log::debug!("image '{}' {:?} for {}", name, expansion, wraps);
            if let Expansion::Expanded { image, .. } = expansion {
                if let Err(e) = host.replace_image(&name, image) {
                    report.skipped.push(e);
                    continue;
                }
                report.images_expanded += 1;
            }
            expanded.insert(name, scale);
            material_scale.get_or_insert(scale);
        }

        let Some(scale) = material_scale else {
            continue;
        };
        for object in users {
            if !remapped.insert(object.name.clone()) {
                continue;
            }
            match host.uv_layers_mut(&object.name) {
                Some(layers) => {
                    report.uv_layers_remapped += remap_uv_layers(layers, scale);
                    report.objects_remapped += 1;
                }
                None => report
                    .skipped
                    .push(LookupError::ObjectMissing(object.name.clone())),
            }
        }
        log::info!("condensed {} wraps of material '{}'", wraps, material);
    }

    log::info!(
        "condensed wraps: {} images expanded, {} objects remapped, {} skipped",
        report.images_expanded,
        report.objects_remapped,
        report.skipped.len()
    );
    report
}

/// Multiplies the scale of every mesh object by `factor`. Returns how many
/// objects were scaled.
pub fn scale_scene<H: SceneCollaborator>(host: &mut H, factor: f32) -> usize {
    let mut scaled = 0;
    for object in host.objects() {
        if object.kind != ObjectKind::Mesh {
            continue;
        }
        let Some(scale) = host.scale(&object.name) else {
            continue;
        };
        match host.set_scale(&object.name, scale * factor) {
            Ok(()) => scaled += 1,
            Err(e) => log::warn!("{}", e),
        }
    }
    log::info!("scaled {} objects by {}", scaled, factor);
    scaled
}
