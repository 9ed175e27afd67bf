//! `stencil check` — parse templates and report syntax errors.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use stencil_renderer::{Engine, EngineConfig};

/// Arguments for `stencil check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Template names to parse.
    #[arg(required = true, value_name = "TEMPLATE")]
    pub names: Vec<String>,

    /// Directory templates are loaded from.
    #[arg(long, short = 't', value_name = "DIR")]
    pub templates: Option<PathBuf>,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let engine = Engine::with_config(EngineConfig {
            template_dir: self.templates,
            ..EngineConfig::default()
        });

        let mut failures = 0usize;
        for name in &self.names {
            match engine.load_by_name(name) {
                Ok(t) => println!("ok    {}", t.name()),
                Err(e) => {
                    failures += 1;
                    eprintln!("error {name}: {e}");
                }
            }
        }

        if failures > 0 {
            bail!("{failures} of {} template(s) failed to parse", self.names.len());
        }
        Ok(())
    }
}
