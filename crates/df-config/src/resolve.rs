//! Config path resolution: CLI flag first, then environment.

use std::path::{Path, PathBuf};

/// Environment variable naming a pipeline config file.
pub const CONFIG_ENV_VAR: &str = "DATAFLAME_CONFIG";

/// Resolve the pipeline config path from the CLI flag or `DATAFLAME_CONFIG`.
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    resolve_config_path_from(cli_path, std::env::var(CONFIG_ENV_VAR).ok())
}

/// Resolution with the environment value supplied by the caller.
pub fn resolve_config_path_from(
    cli_path: Option<&Path>,
    env_value: Option<String>,
) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }
    env_value
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_wins_over_env() {
        let resolved =
            resolve_config_path_from(Some(Path::new("cli.json")), Some("env.json".into()));
        assert_eq!(resolved, Some(PathBuf::from("cli.json")));
    }

    #[test]
    fn env_used_when_cli_absent() {
        let resolved = resolve_config_path_from(None, Some("env.json".into()));
        assert_eq!(resolved, Some(PathBuf::from("env.json")));
    }

    #[test]
    fn blank_env_ignored() {
        assert_eq!(resolve_config_path_from(None, Some("  ".into())), None);
        assert_eq!(resolve_config_path_from(None, None), None);
    }
}
