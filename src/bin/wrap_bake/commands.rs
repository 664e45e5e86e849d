use std::fs;
use std::path::{Path, PathBuf};

use image::{ColorType, DynamicImage};
use wrap_bake::collada::load_wrap_table;
use wrap_bake::config::{resolve_project_path, CondenseConfig, ExportConfig};
use wrap_bake::error::{BoxError, LookupError};
use wrap_bake::{mirror_expand, reconcile_glb, Container, Expansion, ReconcileOptions, UvScale, WrapPair};

use crate::{Cli, Command, ExpandArgs, ReconcileArgs};

pub fn run(cli: Cli) -> Result<(), BoxError> {
    let project_dir = match cli.project_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    match cli.command {
        Command::Reconcile(args) => reconcile(args, &project_dir),
        Command::Expand(args) => expand(args, &project_dir),
        Command::Inspect { path } => inspect(&resolve_project_path(&path, &project_dir)),
        Command::Wraps { path } => {
            let table = load_wrap_table(&resolve_project_path(&path, &project_dir))?;
            println!("{}", serde_json::to_string_pretty(&table)?);
            Ok(())
        }
    }
}

fn report_skipped(skipped: &[LookupError]) {
    for e in skipped {
        log::warn!("skipped: {}", e);
    }
}

fn reconcile(args: ReconcileArgs, project_dir: &Path) -> Result<(), BoxError> {
    let config = ExportConfig {
        dae_path: Some(args.dae),
        input_path: Some(args.input),
        output_directory: args.output_dir,
        output_filename: args.output_name,
    };
    let resolved = config.resolve(project_dir)?;
    let table = load_wrap_table(&resolved.dae_path)?;
    let input = fs::read(&resolved.input_path)?;

    let options = ReconcileOptions {
        prune_orphans: args.prune_orphans,
    };
    let (bytes, report) = reconcile_glb(&input, &table, None, options)?;
    report_skipped(&report.skipped);

    fs::write(&resolved.output_path, &bytes)?;
    println!(
        "wrote {} ({} bytes): {} samplers added, {} textures repointed, {} pruned",
        resolved.output_path.display(),
        bytes.len(),
        report.samplers_added,
        report.textures_repointed,
        report.samplers_pruned
    );
    Ok(())
}

fn expand_wraps(args: &ExpandArgs, project_dir: &Path) -> Result<WrapPair, BoxError> {
    if let (Some(s), Some(t)) = (args.wrap_s, args.wrap_t) {
        return Ok(WrapPair::new(s, t));
    }
    let dae_path = CondenseConfig {
        dae_path: args.dae.clone(),
    }
    .resolve(project_dir)?;
    let material = args.material.as_deref().unwrap_or_default();
    let table = load_wrap_table(&dae_path)?;
    table
        .get(material)
        .ok_or_else(|| LookupError::MaterialNotInDocument(material.to_string()).into())
}

fn default_output(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match image.extension() {
        Some(ext) => format!("{}_mirrored.{}", stem, ext.to_string_lossy()),
        None => format!("{}_mirrored.png", stem),
    };
    image.with_file_name(name)
}

/// Float data stays float for `.exr`. Other targets keep the source's bit depth.
fn encoded_for(source: ColorType, output: &Path, expanded: DynamicImage) -> DynamicImage {
    let is_exr = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("exr"));
    if is_exr {
        expanded
    } else if source.bytes_per_pixel() / source.channel_count() > 1 {
        DynamicImage::ImageRgba16(expanded.to_rgba16())
    } else {
        DynamicImage::ImageRgba8(expanded.to_rgba8())
    }
}

fn expand(args: ExpandArgs, project_dir: &Path) -> Result<(), BoxError> {
    let wraps = expand_wraps(&args, project_dir)?;
    let image_path = resolve_project_path(&args.image, project_dir);
    let source = image::open(&image_path)?;
    let raster = source.to_rgba32f();

    let expansion = mirror_expand(&raster, wraps);
    let scale = UvScale::from_expansion(&expansion);
    let Expansion::Expanded { image, .. } = expansion else {
        println!("{} does not mirror, nothing to do", wraps);
        return Ok(());
    };

    let output = match &args.output {
        Some(path) => resolve_project_path(path, project_dir),
        None => default_output(&image_path),
    };
    let expanded = encoded_for(source.color(), &output, DynamicImage::ImageRgba32F(image));
    expanded.save(&output)?;

    println!(
        "wrote {} ({}x{} -> {}x{}), scale UVs by ({}, {})",
        output.display(),
        raster.width(),
        raster.height(),
        expanded.width(),
        expanded.height(),
        scale.0.x,
        scale.0.y
    );
    Ok(())
}

fn inspect(path: &Path) -> Result<(), BoxError> {
    let bytes = fs::read(path)?;
    let container = Container::from_slice(&bytes)?;
    print!("{}", container);

    if let Some(json) = container.json_chunk() {
        let value: serde_json::Value = serde_json::from_slice(&json.data)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
