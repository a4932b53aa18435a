//! `rollcfg resolve`

use rollcfg_core::{PipelineConfig, synthesize};

use crate::cli::ResolveArgs;
use crate::config::load_request;
use crate::error::Result;
use crate::ui;

/// Resolve the request and print the configuration to stdout.
pub fn execute(args: ResolveArgs, quiet: bool) -> Result<()> {
    let config = resolve(&args)?;

    println!("{}", render(&config, args.compact)?);

    if !quiet {
        let mode = if config.settings.environment.production {
            "production"
        } else {
            "development"
        };
        let mut summary = format!("Resolved {} stages ({mode})", config.plugins.len());
        if !config.diagnostics.is_empty() {
            summary.push_str(&format!(
                ", named exports unavailable for {}",
                config
                    .diagnostics
                    .iter()
                    .map(|failure| failure.package.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        ui::success(&summary);
    }

    Ok(())
}

/// Load every request source and synthesize.
pub fn resolve(args: &ResolveArgs) -> Result<PipelineConfig> {
    let request = load_request(args)?;
    Ok(synthesize(&request)?)
}

pub fn render(config: &PipelineConfig, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(config)?
    } else {
        serde_json::to_string_pretty(config)?
    };
    Ok(json)
}
