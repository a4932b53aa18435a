//! Command-line interface definition.
//!
//! - `rollcfg resolve` - Print the resolved pipeline configuration as JSON
//! - `rollcfg stages` - List pipeline stages in execution order

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rollcfg_core::StageKind;
use serde_json::{Value, json};

/// rollcfg - resolve bundler pipeline configuration from build intents
#[derive(Parser, Debug)]
#[command(
    name = "rollcfg",
    version,
    about = "Resolve a bundler pipeline configuration",
    long_about = "rollcfg combines build intents (rollcfg.toml, rollcfg.json, ROLLCFG_* variables\n\
                  and flags) with the project's package.json and prints a complete, ordered\n\
                  bundler pipeline configuration."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve and print the pipeline configuration
    ///
    /// Sources, lowest to highest precedence: rollcfg.toml, rollcfg.json
    /// (or --config), ROLLCFG_* environment variables, command-line flags.
    Resolve(ResolveArgs),

    /// List pipeline stages in execution order
    Stages,
}

#[derive(Args, Debug, Default, Clone)]
pub struct ResolveArgs {
    /// Project root holding package.json and node_modules
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Request file (JSON or TOML) used instead of rollcfg.json
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Force a production build
    #[arg(long, conflicts_with = "development")]
    pub production: bool,

    /// Force a development build
    #[arg(long)]
    pub development: bool,

    /// Library mode: emit declarations and externalize dependencies
    #[arg(long)]
    pub library: bool,

    /// Minify output regardless of mode
    #[arg(long, conflicts_with = "no_minify")]
    pub minify: bool,

    /// Never minify output
    #[arg(long)]
    pub no_minify: bool,

    /// Source map emission
    #[arg(long, value_enum, value_name = "MODE")]
    pub sourcemap: Option<SourceMapArg>,

    /// Omit a stage from the pipeline (stage key or plugin name)
    #[arg(long = "disable", value_name = "STAGE", value_parser = parse_stage)]
    pub disable: Vec<StageKind>,

    /// Do not read the project's .env file
    #[arg(long)]
    pub no_dotenv: bool,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

impl ResolveArgs {
    /// Request fields set by flags, in request (camelCase) form.
    pub fn overrides(&self) -> Value {
        let mut overrides = json!({});

        if self.production {
            overrides["isProduction"] = json!(true);
        } else if self.development {
            overrides["isProduction"] = json!(false);
        }
        if self.library {
            overrides["isLibrary"] = json!(true);
        }
        if self.minify {
            overrides["minify"] = json!(true);
        } else if self.no_minify {
            overrides["minify"] = json!(false);
        }
        if self.no_dotenv {
            overrides["dotenv"] = json!(false);
        }
        if let Some(sourcemap) = self.sourcemap {
            overrides["sourcemap"] = sourcemap.to_value();
        }
        if !self.disable.is_empty() {
            let plugins: serde_json::Map<String, Value> = self
                .disable
                .iter()
                .map(|kind| (kind.key().to_string(), Value::Bool(false)))
                .collect();
            overrides["plugins"] = Value::Object(plugins);
        }

        overrides
    }
}

/// Source map mode accepted on the command line
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum SourceMapArg {
    #[value(name = "true")]
    On,
    #[value(name = "false")]
    Off,
    /// Maps without a sourceMappingURL comment
    Hidden,
    /// Maps embedded as data URLs
    Inline,
}

impl SourceMapArg {
    fn to_value(self) -> Value {
        match self {
            SourceMapArg::On => json!(true),
            SourceMapArg::Off => json!(false),
            SourceMapArg::Hidden => json!("hidden"),
            SourceMapArg::Inline => json!("inline"),
        }
    }
}

fn parse_stage(s: &str) -> Result<StageKind, String> {
    s.parse().map_err(|e: rollcfg_core::ConfigError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rollcfg").chain(args.iter().copied())).unwrap()
    }

    fn resolve_args(args: &[&str]) -> ResolveArgs {
        match parse(args).command {
            Command::Resolve(args) => args,
            other => panic!("expected resolve, got {other:?}"),
        }
    }

    #[test]
    fn no_flags_means_no_overrides() {
        assert_eq!(resolve_args(&["resolve"]).overrides(), json!({}));
    }

    #[test]
    fn flags_map_to_request_fields() {
        let args = resolve_args(&[
            "resolve",
            "--production",
            "--library",
            "--no-minify",
            "--sourcemap",
            "hidden",
            "--disable",
            "terser",
            "--disable",
            "styles",
            "--no-dotenv",
        ]);

        assert_eq!(
            args.overrides(),
            json!({
                "isProduction": true,
                "isLibrary": true,
                "minify": false,
                "dotenv": false,
                "sourcemap": "hidden",
                "plugins": { "minify": false, "styles": false }
            })
        );
    }

    #[test]
    fn development_flag_sets_false() {
        let args = resolve_args(&["resolve", "--development", "--sourcemap", "false"]);
        assert_eq!(
            args.overrides(),
            json!({ "isProduction": false, "sourcemap": false })
        );
    }

    #[test]
    fn unknown_stage_is_rejected() {
        let err = Cli::try_parse_from(["rollcfg", "resolve", "--disable", "uglify"]).unwrap_err();
        assert!(err.to_string().contains("unknown stage"));
    }

    #[test]
    fn production_and_development_conflict() {
        assert!(Cli::try_parse_from(["rollcfg", "resolve", "--production", "--development"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["stages", "--quiet", "--no-color"]);
        assert!(cli.quiet);
        assert!(cli.no_color);
    }
}
