use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use ropes::{
    ConfiguredTransport, Loader, Manifest, Registry, Ropes, RopesConfig, TransportConfig,
    ViewModelFactory,
};
use tokio::task::LocalSet;

use crate::error::{DemoError, Result};
use crate::format::display;
use crate::text_engine::TextEngine;
use crate::view_models::{ContactQuickStats, OutletQuickStats, system_clock};

pub const CONTACT_ANCHOR: &str = "#contact-quick-stats";
pub const OUTLET_ANCHOR: &str = "#outlet-quick-stats";

#[derive(Debug, Parser)]
#[command(
    name = "ropes-demo",
    about = "Contact and outlet quick stats, loaded once per endpoint",
    version
)]
pub struct Cli {
    /// Runtime config (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Bind both panels, load their data, and print them before and after.
    Run(RunArgs),

    /// List the manifest's data objects and field defaults.
    Models(ModelsArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Data object manifest.
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Serve endpoints from this directory.
    #[arg(long, conflicts_with = "base_url")]
    pub root: Option<PathBuf>,

    /// Fetch endpoints over HTTP relative to this URL.
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ModelsArgs {
    /// Data object manifest.
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

/// Directory holding the bundled manifest and fixtures.
#[must_use]
pub fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    ropes::logging::init(&config)?;
    run(cli, config, &mut std::io::stdout())
}

pub fn run(cli: Cli, config: RopesConfig, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run_demo(&args, config, out),
        Commands::Models(args) => list_models(&args, &config, out),
    }
}

fn load_config(path: Option<&Path>) -> Result<RopesConfig> {
    match path {
        Some(path) if !path.exists() => Err(DemoError::MissingPath {
            path: path.to_path_buf(),
        }),
        Some(path) => Ok(RopesConfig::load(path)?),
        None => Ok(RopesConfig {
            transport: TransportConfig::Files { root: data_dir() },
            ..RopesConfig::default()
        }),
    }
}

fn manifest_path(arg: Option<&Path>, config: &RopesConfig) -> PathBuf {
    arg.map(Path::to_path_buf)
        .or_else(|| config.manifest.clone())
        .unwrap_or_else(|| data_dir().join("ropes.toml"))
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    if !path.exists() {
        return Err(DemoError::MissingPath {
            path: path.to_path_buf(),
        });
    }
    Ok(Manifest::load(path)?)
}

fn run_demo(args: &RunArgs, mut config: RopesConfig, out: &mut dyn Write) -> Result<()> {
    if let Some(root) = &args.root {
        config.transport = TransportConfig::Files { root: root.clone() };
    }
    if let Some(base_url) = &args.base_url {
        config.transport = TransportConfig::Http {
            base_url: base_url.clone(),
            timeout_ms: None,
        };
    }

    let manifest = load_manifest(&manifest_path(args.manifest.as_deref(), &config))?;
    let registry: Registry = manifest.to_registry()?;
    let loader: Loader<ConfiguredTransport> = Loader::new(config.build_transport()?);
    let engine = TextEngine::new();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = LocalSet::new();

    let contact = ContactQuickStats::factory(system_clock());
    let outlet = OutletQuickStats::factory();
    let entries: [(&str, &dyn ViewModelFactory); 2] =
        [(CONTACT_ANCHOR, &contact), (OUTLET_ANCHOR, &outlet)];

    let outcomes = local.block_on(&runtime, async {
        let dispatch = Ropes::new(&registry, &loader, &engine).bind(&entries)?;
        writeln!(out, "== before load ==")?;
        write!(out, "{}", engine.snapshot())?;
        Ok::<_, DemoError>(dispatch.settle().await)
    })?;

    let total = outcomes.len();
    let failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();
    for outcome in &outcomes {
        if let Err(err) = &outcome.result {
            tracing::warn!(endpoint = %outcome.endpoint, error = %err, "demo.load.failed");
        }
    }

    writeln!(out, "== after load ==")?;
    write!(out, "{}", engine.snapshot())?;

    if failed > 0 {
        return Err(DemoError::LoadFailed { failed, total });
    }
    Ok(())
}

fn list_models(args: &ModelsArgs, config: &RopesConfig, out: &mut dyn Write) -> Result<()> {
    let manifest = load_manifest(&manifest_path(args.manifest.as_deref(), config))?;
    for decl in &manifest.data_objects {
        let endpoint = decl.endpoint.as_deref().unwrap_or("-");
        match decl.response_node.as_deref() {
            Some(node) => writeln!(out, "{} <- {endpoint} [{node}]", decl.name)?,
            None => writeln!(out, "{} <- {endpoint}", decl.name)?,
        }
        for field in &decl.fields {
            writeln!(
                out,
                "  {} = {} (default: {:?})",
                field.client_key,
                field.api_key,
                display(&field.default)
            )?;
        }
    }
    Ok(())
}
