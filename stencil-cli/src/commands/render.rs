//! `stencil render` — render one template, writing any `create`d files.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use stencil_renderer::{Engine, EngineConfig, EscapeMode, Value, WriteResult};

use super::data::{bind_document, read_data_file, KeyValue};

/// Arguments for `stencil render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Template name, resolved against `--templates` (or the working directory).
    pub template: String,

    /// Directory templates are loaded from.
    #[arg(long, short = 't', value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// JSON or YAML file whose top-level keys become variables. Repeatable;
    /// later files win.
    #[arg(long, short = 'd', value_name = "FILE")]
    pub data: Vec<PathBuf>,

    /// Bind a single text variable. Applied after `--data`.
    #[arg(long = "set", short = 's', value_name = "KEY=VALUE")]
    pub set: Vec<KeyValue>,

    /// Directory `create` tags write into.
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Escaping applied to non-raw variable output.
    #[arg(long, value_name = "MODE")]
    pub escape: Option<EscapeMode>,

    /// YAML engine configuration; flags override its values.
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the rendered output here instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Bind `forloop` inside `for` bodies.
    #[arg(long)]
    pub loop_metadata: bool,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let config = self.engine_config()?;
        let engine = Engine::with_config(config);

        let mut ctx = engine.create_context();
        ctx.set(
            "generated_at",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        );
        for path in &self.data {
            let doc = read_data_file(path)?;
            bind_document(&mut ctx, path, &doc)?;
        }
        for kv in &self.set {
            ctx.set(kv.key.as_str(), Value::from(kv.value.as_str()));
        }

        let template = engine
            .load_by_name(&self.template)
            .with_context(|| format!("cannot load template '{}'", self.template))?;
        let mut output = String::new();
        let writes = template
            .render(&mut output, &mut ctx)
            .with_context(|| format!("failed to render '{}'", self.template))?;

        match &self.out {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("cannot create '{}'", parent.display()))?;
                }
                std::fs::write(path, &output)
                    .with_context(|| format!("cannot write '{}'", path.display()))?;
            }
            None => print!("{output}"),
        }

        print_writes(&writes);
        Ok(())
    }

    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)
                .with_context(|| format!("cannot load config '{}'", path.display()))?,
            None => EngineConfig::default(),
        };
        if let Some(dir) = &self.templates {
            config.template_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(mode) = self.escape {
            config.escape = mode;
        }
        if self.loop_metadata {
            config.loop_metadata = true;
        }
        tracing::debug!(?config, "effective engine config");
        Ok(config)
    }
}

/// Summarise `create` results on stderr so stdout stays the rendered text.
fn print_writes(writes: &[WriteResult]) {
    if writes.is_empty() {
        return;
    }
    let mut written = 0;
    let mut unchanged = 0;
    for w in writes {
        match w {
            WriteResult::Written { path } => {
                written += 1;
                eprintln!("  wrote     {}", path.display());
            }
            WriteResult::Unchanged { .. } => unchanged += 1,
            WriteResult::Failed { path, reason } => {
                eprintln!("  failed    {} ({reason})", path.display());
            }
        }
    }
    let failed = writes.len() - written - unchanged;
    eprintln!("{written} written, {unchanged} unchanged, {failed} failed");
}
