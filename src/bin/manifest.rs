//! Plugin Manifest CLI
//!
//! Converts plugin manifests and diffs two versions of one.

use anyhow::Context;
use clap::{Parser, Subcommand};
use plugin_schemas::manifest::{convert, TranslatedRoot, TranslationDocument};
use plugin_schemas::{ConvertOptions, Manifest, ManifestDocument, PluginConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plugin-manifest")]
#[command(about = "Check plugin manifests and diff plugin versions")]
struct Cli {
    /// Config file layered over plugins.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Allow system-only extension types
    #[arg(long)]
    system: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a manifest and print the JSON-Schema of every property schema
    Check {
        /// Manifest file (JSON)
        manifest: PathBuf,
        /// Translation files, as LOCALE=PATH
        #[arg(short, long = "translation")]
        translations: Vec<String>,
    },

    /// Print the diff between two manifest versions as JSON
    Diff {
        /// Old manifest (JSON)
        old: PathBuf,
        /// New manifest (JSON)
        new: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = PluginConfig::load_from(cli.config.as_deref().and_then(Path::to_str))
        .context("loading configuration")?;
    let mut opts = ConvertOptions::from(&config);
    opts.system |= cli.system;

    match cli.command {
        Commands::Check {
            manifest,
            translations,
        } => {
            let doc = read_manifest(&manifest)?;
            let mut docs = Vec::with_capacity(translations.len());
            for t in &translations {
                let (locale, path) = t
                    .split_once('=')
                    .with_context(|| format!("translation '{t}' is not LOCALE=PATH"))?;
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {path}"))?;
                let tr: TranslationDocument = serde_json::from_str(&content)
                    .with_context(|| format!("parsing {path}"))?;
                docs.push((locale, tr));
            }
            let translated = (!docs.is_empty())
                .then(|| TranslatedRoot::new(docs.iter().map(|(locale, doc)| (*locale, doc))));

            let m = convert(&doc, translated.as_ref(), &opts)
                .with_context(|| format!("converting {}", manifest.display()))?;
            println!(
                "✅ {} - {} extension(s)",
                m.plugin.id(),
                m.plugin.extensions().len()
            );
            let schemas: serde_json::Map<String, serde_json::Value> = m
                .schemas()
                .map(|s| (s.id().to_string(), s.json_schema()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&schemas)?);
            Ok(())
        }

        Commands::Diff { old, new } => {
            let old_m = load(&old, &opts)?;
            let new_m = load(&new, &opts)?;
            let diff = old_m.diff(&new_m);
            if diff.is_empty() {
                println!("✅ {} -> {}: no changes", diff.from, diff.to);
            }
            println!("{}", serde_json::to_string_pretty(&diff)?);
            Ok(())
        }
    }
}

fn read_manifest(path: &Path) -> anyhow::Result<ManifestDocument> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn load(path: &Path, opts: &ConvertOptions) -> anyhow::Result<Manifest> {
    let doc = read_manifest(path)?;
    convert(&doc, None, opts).with_context(|| format!("converting {}", path.display()))
}
