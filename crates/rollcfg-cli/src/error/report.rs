//! Miette diagnostic conversion for CLI errors.

use miette::Report;
use rollcfg_core::ConfigError;

use crate::error::CliError;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Engine(e) => engine_error_to_miette(e),
        CliError::ConfigNotFound(path) => miette::miette!(
            help = "Pass an existing JSON or TOML file to --config, or drop the flag to use rollcfg.json",
            "config file not found: {}",
            path.display()
        ),
        CliError::Load(e) => miette::miette!(
            help = "Check rollcfg.toml, rollcfg.json and ROLLCFG_* variables for syntax and field types",
            "failed to load request configuration: {}",
            e
        ),
        err @ CliError::Dotenv { .. } => miette::miette!(
            help = "Fix the KEY=value lines in the file, or pass --no-dotenv to skip it",
            "{}",
            err
        ),
        other => miette::miette!("{}", other),
    }
}

/// Convert engine errors, attaching a hint where one helps.
pub fn engine_error_to_miette(err: ConfigError) -> Report {
    match &err {
        ConfigError::ManifestNotFound { .. } => miette::miette!(
            help = "Run from the project root, pass --root, or supply a packageJson fragment",
            "{}",
            err
        ),
        ConfigError::InvalidInjectionName { .. } => miette::miette!(
            help = "Injected names must match [A-Za-z_$][A-Za-z0-9_$]*",
            "{}",
            err
        ),
        ConfigError::StageConfiguration { .. } => miette::miette!(
            help = "Run `rollcfg stages` to list stage names; overrides must be true, false or an object",
            "{}",
            err
        ),
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_config_file_carries_help() {
        let report = cli_error_to_miette(CliError::ConfigNotFound(PathBuf::from("nope.json")));
        assert!(report.to_string().contains("nope.json"));
        assert!(report.help().is_some());
    }

    #[test]
    fn engine_errors_keep_their_message() {
        let report = cli_error_to_miette(CliError::Engine(ConfigError::InvalidInjectionName {
            name: "a-b".into(),
        }));
        assert!(report.to_string().contains("a-b"));
    }
}
