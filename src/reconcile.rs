//! Gives textures samplers whose wrap values match their material's declared
//! wrap modes.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::document::{Sampler, SamplerWrap, StructuredScene};
use crate::error::LookupError;
use crate::host::MaterialImages;
use crate::wrap_table::WrapModeTable;

type WrapKey = (SamplerWrap, SamplerWrap);

#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Drop samplers no texture references once reconciliation is done.
    pub prune_orphans: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub samplers_added: usize,
    pub textures_repointed: usize,
    pub samplers_pruned: usize,
    pub skipped: Vec<LookupError>,
}

/// Sampler index by wrap pair. The first sampler seen for a pair keeps it.
struct SamplerIndex {
    by_wraps: HashMap<WrapKey, usize>,
    added: HashMap<WrapKey, usize>,
}

impl SamplerIndex {
    fn new(samplers: &[Sampler]) -> Self {
        let mut by_wraps = HashMap::new();
        for (i, sampler) in samplers.iter().enumerate() {
            by_wraps.entry(sampler.wraps()).or_insert(i);
        }
        Self {
            by_wraps,
            added: HashMap::new(),
        }
    }

    fn find(&self, wraps: WrapKey) -> Option<usize> {
        self.by_wraps.get(&wraps).copied()
    }

    fn find_added(&self, wraps: WrapKey) -> Option<usize> {
        self.added.get(&wraps).copied()
    }

    fn push(&mut self, samplers: &mut Vec<Sampler>, sampler: Sampler) -> usize {
        let wraps = sampler.wraps();
        let index = samplers.len();
        samplers.push(sampler);
        self.by_wraps.entry(wraps).or_insert(index);
        self.added.insert(wraps, index);
        index
    }
}

pub fn reconcile_samplers(
    scene: &mut StructuredScene,
    table: &WrapModeTable,
    host: &dyn MaterialImages,
    options: ReconcileOptions,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let mut index = SamplerIndex::new(&scene.samplers);

    let document_materials: HashSet<&str> = scene
        .materials
        .iter()
        .filter_map(|m| m.name.as_deref())
        .collect();
    for (name, _) in table.iter() {
        if !document_materials.contains(name) {
            log::debug!("material '{}' is not in the document", name);
            report
                .skipped
                .push(LookupError::MaterialNotInDocument(name.to_string()));
        }
    }

    let material_names: Vec<String> = scene
        .materials
        .iter()
        .filter_map(|m| m.name.clone())
        .collect();
    let mut seen = HashSet::new();
    for name in material_names {
        if !seen.insert(name.clone()) {
            continue;
        }
        let Some(pair) = table.get(&name) else {
            continue;
        };
        let Some(bases) = host.image_base_names(&name) else {
            log::warn!("material '{}' not found in the host scene, skipping", name);
            report.skipped.push(LookupError::MaterialNotInHost(name));
            continue;
        };
        let target = pair.sampler_wraps();
        log::debug!(
            "material '{}' wants {} = {:?}, images {:?}",
            name,
            pair,
            target,
            bases
        );
        reconcile_material(scene, &bases, target, &mut index, &mut report);
    }

    if options.prune_orphans {
        report.samplers_pruned = prune_unused_samplers(scene);
    }

    log::info!(
        "reconciled samplers: {} added, {} textures repointed, {} pruned, {} skipped",
        report.samplers_added,
        report.textures_repointed,
        report.samplers_pruned,
        report.skipped.len()
    );
    report
}

fn reconcile_material(
    scene: &mut StructuredScene,
    bases: &BTreeSet<String>,
    target: WrapKey,
    index: &mut SamplerIndex,
    report: &mut ReconcileReport,
) {
    for t in 0..scene.textures.len() {
        let texture = &scene.textures[t];
        let Some(source) = texture.source else {
            continue;
        };
        let Some(image_name) = scene.texture_image_name(texture).map(str::to_string) else {
            log::warn!("texture {} points at missing image {}, skipping", t, source);
            continue;
        };
        if !bases.iter().any(|base| image_name.starts_with(base.as_str())) {
            continue;
        }

        let current_index = texture.sampler;
        let current = current_index.and_then(|s| scene.samplers.get(s)).cloned();
        let new_index = match &current {
            Some(sampler) if sampler.wraps() == target => continue,
            Some(sampler) => match index.find(target) {
                Some(existing) => existing,
                None => {
                    report.samplers_added += 1;
                    index.push(&mut scene.samplers, Sampler::with_wraps(target, Some(sampler)))
                }
            },
            None => {
                if let Some(dangling) = current_index {
                    log::warn!("texture {} points at missing sampler {}", t, dangling);
                }
                // no sampler to compare against, so pre-existing ones are not
                // searched; one added earlier in this run is reused
                match index.find_added(target) {
                    Some(added) => added,
                    None => {
                        report.samplers_added += 1;
                        index.push(&mut scene.samplers, Sampler::with_wraps(target, None))
                    }
                }
            }
        };

        log::debug!(
            "texture {} ('{}') sampler {:?} -> {}",
            t,
            image_name,
            current_index,
            new_index
        );
        scene.textures[t].sampler = Some(new_index);
        report.textures_repointed += 1;
    }
}

/// Removes samplers no texture references and renumbers the references.
/// Returns how many were removed.
pub fn prune_unused_samplers(scene: &mut StructuredScene) -> usize {
    let used: HashSet<usize> = scene.textures.iter().filter_map(|t| t.sampler).collect();
    let before = scene.samplers.len();

    let mut remap = HashMap::new();
    let mut kept = Vec::with_capacity(before);
    for (i, sampler) in scene.samplers.drain(..).enumerate() {
        if used.contains(&i) {
            remap.insert(i, kept.len());
            kept.push(sampler);
        }
    }
    let pruned = before - kept.len();
    scene.samplers = kept;

    for texture in &mut scene.textures {
        if let Some(old) = texture.sampler {
            match remap.get(&old) {
                Some(&new) => texture.sampler = Some(new),
                None => {
                    log::warn!("dropping dangling sampler reference {}", old);
                    texture.sampler = None;
                }
            }
        }
    }
    pruned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MagFilter, MinFilter};
    use crate::wrap_mode::{WrapMode, WrapPair};
    use serde_json::json;

    fn host(entries: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(m, images)| (m.to_string(), images.iter().map(|i| i.to_string()).collect()))
            .collect()
    }

    fn scene(value: serde_json::Value) -> StructuredScene {
        serde_json::from_value(value).unwrap()
    }

    fn mirror_s() -> WrapPair {
        WrapPair::new(WrapMode::Mirror, WrapMode::Repeat)
    }

    #[test]
    fn repoints_to_a_matching_sampler() {
        let mut doc = scene(json!({
            "materials": [{ "name": "Rock" }],
            "images": [{ "name": "rock_alb" }],
            "textures": [{ "source": 0, "sampler": 0 }],
            "samplers": [{ "wrapS": 10497, "wrapT": 10497 }, { "wrapS": 33648, "wrapT": 10497 }]
        }));
        let table = WrapModeTable::from_entries([("Rock", mirror_s())]);
        let report = reconcile_samplers(
            &mut doc,
            &table,
            &host(&[("Rock", &["rock_alb.png"])]),
            ReconcileOptions::default(),
        );
        assert_eq!(report.samplers_added, 0);
        assert_eq!(report.textures_repointed, 1);
        assert_eq!(doc.textures[0].sampler, Some(1));
        assert_eq!(doc.samplers.len(), 2);
    }

    #[test]
    fn appends_sampler_copying_filters() {
        let mut doc = scene(json!({
            "materials": [{ "name": "Rock" }],
            "images": [{ "name": "rock_alb" }],
            "textures": [{ "source": 0, "sampler": 0 }],
            "samplers": [{ "magFilter": 9728, "minFilter": 9728 }]
        }));
        let table = WrapModeTable::from_entries([("Rock", mirror_s())]);
        let report = reconcile_samplers(
            &mut doc,
            &table,
            &host(&[("Rock", &["rock_alb"])]),
            ReconcileOptions::default(),
        );
        assert_eq!(report.samplers_added, 1);
        assert_eq!(doc.textures[0].sampler, Some(1));
        let added = &doc.samplers[1];
        assert_eq!(added.wrap_s, Some(SamplerWrap::MirroredRepeat));
        assert_eq!(added.wrap_t, Some(SamplerWrap::Repeat));
        assert_eq!(added.mag_filter, Some(MagFilter::Nearest));
        assert_eq!(added.min_filter, Some(MinFilter::Nearest));
        // the old sampler stays
        assert_eq!(doc.samplers[0].wrap_s, None);
    }

    #[test]
    fn texture_without_sampler_gets_fresh_one() {
        let mut doc = scene(json!({
            "materials": [{ "name": "Rock" }],
            "images": [{ "name": "rock_alb" }, { "name": "rock_nrm" }],
            "textures": [{ "source": 0 }, { "source": 1 }],
            "samplers": [{ "wrapS": 33648, "wrapT": 10497 }]
        }));
        let table = WrapModeTable::from_entries([("Rock", mirror_s())]);
        let report = reconcile_samplers(
            &mut doc,
            &table,
            &host(&[("Rock", &["rock_alb.png", "rock_nrm.png"])]),
            ReconcileOptions::default(),
        );
        // one new sampler shared by both textures, the matching old one is not searched
        assert_eq!(report.samplers_added, 1);
        assert_eq!(doc.samplers.len(), 2);
        assert_eq!(doc.textures[0].sampler, Some(1));
        assert_eq!(doc.textures[1].sampler, Some(1));
        assert_eq!(doc.samplers[1].mag_filter, Some(MagFilter::Linear));
        assert_eq!(doc.samplers[1].min_filter, Some(MinFilter::LinearMipmapLinear));
    }

    #[test]
    fn matching_samplers_add_nothing() {
        let mut doc = scene(json!({
            "materials": [{ "name": "Rock" }, { "name": "Cliff" }],
            "images": [{ "name": "rock" }, { "name": "cliff" }],
            "textures": [{ "source": 0, "sampler": 0 }, { "source": 1, "sampler": 1 }],
            "samplers": [
                { "wrapS": 33648, "wrapT": 10497 },
                { "wrapS": 33648, "wrapT": 10497 }
            ]
        }));
        let before = doc.clone();
        let table = WrapModeTable::from_entries([("Rock", mirror_s()), ("Cliff", mirror_s())]);
        let report = reconcile_samplers(
            &mut doc,
            &table,
            &host(&[("Rock", &["rock"]), ("Cliff", &["cliff"])]),
            ReconcileOptions::default(),
        );
        assert_eq!(report.samplers_added, 0);
        assert_eq!(report.textures_repointed, 0);
        assert_eq!(doc, before);
    }

    #[test]
    fn second_run_changes_nothing() {
        let mut doc = scene(json!({
            "materials": [{ "name": "Rock" }, { "name": "Water" }],
            "images": [{ "name": "rock" }, { "name": "water" }, { "name": "rock_detail" }],
            "textures": [
                { "source": 0, "sampler": 0 },
                { "source": 1 },
                { "source": 2, "sampler": 0 }
            ],
            "samplers": [{ "wrapS": 10497, "wrapT": 10497, "magFilter": 9728 }]
        }));
        let table = WrapModeTable::from_entries([
            ("Rock", mirror_s()),
            ("Water", WrapPair::new(WrapMode::Clamp, WrapMode::Mirror)),
        ]);
        let images = host(&[("Rock", &["rock.png"]), ("Water", &["water.png"])]);

        let first = reconcile_samplers(&mut doc, &table, &images, ReconcileOptions::default());
        assert_eq!(first.samplers_added, 2);
        let after_first = doc.clone();

        let second = reconcile_samplers(&mut doc, &table, &images, ReconcileOptions::default());
        assert_eq!(second.samplers_added, 0);
        assert_eq!(second.textures_repointed, 0);
        assert_eq!(doc, after_first);
    }

    #[test]
    fn border_falls_back_to_repeat() {
        let mut doc = scene(json!({
            "materials": [{ "name": "Fence" }],
            "images": [{ "name": "fence" }],
            "textures": [{ "source": 0 }]
        }));
        let table =
            WrapModeTable::from_entries([("Fence", WrapPair::new(WrapMode::Border, WrapMode::None))]);
        reconcile_samplers(
            &mut doc,
            &table,
            &host(&[("Fence", &["fence"])]),
            ReconcileOptions::default(),
        );
        assert_eq!(
            serde_json::to_value(&doc.samplers[0]).unwrap(),
            json!({ "wrapS": 10497, "wrapT": 10497, "magFilter": 9729, "minFilter": 9987 })
        );
    }

    #[test]
    fn unmatched_entries_are_skipped() {
        let mut doc = scene(json!({
            "materials": [{ "name": "Rock" }, { "name": "Ghost" }],
            "images": [{ "name": "rock" }, { "name": "unrelated" }],
            "textures": [{ "source": 0, "sampler": 0 }, { "source": 1, "sampler": 0 }, { "source": 9 }],
            "samplers": [{}]
        }));
        let table = WrapModeTable::from_entries([
            ("Rock", mirror_s()),
            ("Ghost", mirror_s()),
            ("Absent", mirror_s()),
        ]);
        let report = reconcile_samplers(
            &mut doc,
            &table,
            &host(&[("Rock", &["rock"])]),
            ReconcileOptions::default(),
        );
        assert_eq!(
            report.skipped,
            vec![
                LookupError::MaterialNotInDocument("Absent".into()),
                LookupError::MaterialNotInHost("Ghost".into()),
            ]
        );
        assert_eq!(doc.textures[0].sampler, Some(1));
        assert_eq!(doc.textures[1].sampler, Some(0));
        assert_eq!(doc.textures[2].sampler, None);
    }

    #[test]
    fn prunes_orphans_when_asked() {
        let mut doc = scene(json!({
            "materials": [{ "name": "Rock" }],
            "images": [{ "name": "rock" }, { "name": "sky" }],
            "textures": [{ "source": 0, "sampler": 1 }, { "source": 1, "sampler": 2 }],
            "samplers": [
                { "wrapS": 33071 },
                { "wrapS": 10497 },
                { "wrapS": 33071, "wrapT": 33071 }
            ]
        }));
        let table = WrapModeTable::from_entries([("Rock", mirror_s())]);
        let report = reconcile_samplers(
            &mut doc,
            &table,
            &host(&[("Rock", &["rock"])]),
            ReconcileOptions { prune_orphans: true },
        );
        assert_eq!(report.samplers_added, 1);
        // samplers 0 and 1 lost their last users
        assert_eq!(report.samplers_pruned, 2);
        assert_eq!(doc.samplers.len(), 2);
        assert_eq!(doc.textures[1].sampler, Some(0));
        assert_eq!(doc.textures[0].sampler, Some(1));
        assert_eq!(doc.samplers[1].wrap_s, Some(SamplerWrap::MirroredRepeat));
    }
}
