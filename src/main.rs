use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use componentary::{Behavior, ComponentaryConfig, Document, Registry};

/// Render a manifest of components and instances into an HTML document.
#[derive(Parser, Debug)]
#[command(name = "componentary", version)]
struct Args {
    /// Manifest to read instead of stdin
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Write the document here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Minify injected style text
    #[arg(long)]
    minify: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    #[serde(default)]
    config: ComponentaryConfig,
    components: Vec<ComponentEntry>,
    #[serde(default)]
    instances: Vec<InstanceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ComponentEntry {
    name: String,
    template: String,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InstanceEntry {
    component: String,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    mount: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(Args::parse()) {
        eprintln!("[componentary] {:#}", err);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let payload = read_manifest(&args)?;
    let mut manifest: Manifest =
        serde_json::from_str(&payload).context("invalid manifest JSON")?;
    if args.minify {
        manifest.config.minify_styles = true;
    }

    let registry = Registry::with_config(manifest.config);
    for entry in manifest.components {
        let behavior = behavior_for(&entry);
        registry
            .register(&entry.name, &entry.template, behavior)
            .with_context(|| format!("failed to register component `{}`", entry.name))?;
    }

    let mut doc = Document::new();
    for (index, instance) in manifest.instances.iter().enumerate() {
        let root = registry
            .instantiate(&mut doc, &instance.component, instance.style.as_deref())
            .with_context(|| format!("instances[{}]: failed to instantiate `{}`", index, instance.component))?;

        let parent = match instance.mount.as_deref() {
            Some(id) => doc
                .get_element_by_id(id)
                .ok_or_else(|| anyhow!("instances[{}]: mount point `#{}` not found", index, id))?,
            None => doc.body(),
        };
        doc.append_child(parent, root)
            .with_context(|| format!("instances[{}]: failed to mount", index))?;
        debug!(index, component = %instance.component, "mounted instance");
    }

    let batches = doc.flush_mutations();
    info!(
        components = registry.len(),
        instances = manifest.instances.len(),
        batches,
        "rendered document"
    );

    write_output(args.out.as_ref(), &doc.to_html())
}

fn read_manifest(args: &Args) -> Result<String> {
    let payload = match &args.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest '{}'", path.display()))?,
        None => {
            let mut payload = String::new();
            io::stdin()
                .read_to_string(&mut payload)
                .context("failed to read stdin")?;
            payload
        }
    };
    if payload.trim().is_empty() {
        bail!("manifest is empty");
    }
    Ok(payload)
}

/// Style plus an `on_created` hook applying the manifest attributes.
fn behavior_for(entry: &ComponentEntry) -> Behavior {
    let mut behavior = Behavior::new();
    if let Some(style) = &entry.style {
        behavior = behavior.with_style(style.clone());
    }
    if !entry.attributes.is_empty() {
        let attributes: Vec<(String, String)> = entry
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        behavior = behavior.on_created(move |doc, root| {
            for (name, value) in &attributes {
                if let Err(err) = doc.set_attribute(root, name, value) {
                    warn!(attribute = %name, error = %err, "failed to apply attribute");
                }
            }
        });
    }
    behavior
}

fn write_output(out: Option<&PathBuf>, html: &str) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create output dir '{}'", parent.display()))?;
            }
            fs::write(path, html)
                .with_context(|| format!("failed to write '{}'", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.write_all(b"\n")?;
            Ok(())
        }
    }
}
