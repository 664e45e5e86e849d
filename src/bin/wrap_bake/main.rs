use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use wrap_bake::WrapMode;

mod commands;

/// Carries COLLADA texture wrap modes into GLB files.
#[derive(Parser, Debug)]
#[command(name = "wrap-bake", version)]
pub struct Cli {
    /// Directory `//`-prefixed paths are resolved against. Defaults to the
    /// working directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rewrite the samplers of a GLB so textures use their material's wrap modes.
    Reconcile(ReconcileArgs),
    /// Bake a mirrored wrap into an image by doubling it along mirrored axes.
    Expand(ExpandArgs),
    /// Print the header, chunks and JSON of a GLB.
    Inspect {
        #[arg(value_name = "GLB")]
        path: String,
    },
    /// Print the wrap modes a COLLADA document declares, as JSON.
    Wraps {
        #[arg(value_name = "DAE")]
        path: String,
    },
}

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    #[arg(long, value_name = "DAE")]
    pub dae: String,

    #[arg(short, long, value_name = "GLB")]
    pub input: String,

    /// Defaults to the input's directory.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Output file name, `model` when omitted. `.glb` is appended if missing.
    #[arg(long, value_name = "NAME")]
    pub output_name: Option<String>,

    /// Remove samplers no texture references afterwards.
    #[arg(long)]
    pub prune_orphans: bool,
}

#[derive(Args, Debug)]
pub struct ExpandArgs {
    #[arg(long, value_name = "IMG")]
    pub image: String,

    #[arg(long, value_name = "MODE", requires = "wrap_t", conflicts_with = "dae")]
    pub wrap_s: Option<WrapMode>,

    #[arg(long, value_name = "MODE", requires = "wrap_s", conflicts_with = "dae")]
    pub wrap_t: Option<WrapMode>,

    /// Take the wrap modes of `--material` from this document.
    #[arg(long, value_name = "DAE", requires = "material")]
    pub dae: Option<String>,

    #[arg(long, value_name = "NAME", requires = "dae")]
    pub material: Option<String>,

    /// Defaults to `<image stem>_mirrored` next to the input, same extension.
    #[arg(short, long, value_name = "IMG")]
    pub output: Option<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match commands::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
