//! `graphhook config` — configuration inspection.

use std::path::Path;

use graphhook_config::HookConfig;
use graphhook_core::{Error, Result};

/// Print the effective configuration (file, env overrides, defaults) as TOML.
pub fn show(config: &HookConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config).map_err(|e| Error::Config {
        message: e.to_string(),
    })?;
    println!("{toml_str}");
    Ok(())
}

pub fn path(explicit: Option<&Path>) {
    let config_path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| HookConfig::config_dir().join("config.toml"));
    println!("{}", config_path.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_valid() {
        let path = HookConfig::config_dir().join("config.toml");
        assert!(path.to_str().unwrap().contains(".graphhook"));
    }

    #[test]
    fn effective_config_serializes() {
        let mut config = HookConfig::default();
        config.logging.directory = Some("/var/log/graphhook".into());
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[retrieval]"));
        assert!(toml_str.contains("/var/log/graphhook"));
    }
}
