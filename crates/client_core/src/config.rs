use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
    pub profile: String,
    pub data_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".into(),
            profile: "default".into(),
            data_dir: None,
        }
    }
}

/// Layered settings: defaults, then `storefront.toml` in the working
/// directory, then environment overrides.
pub fn load_settings() -> Settings {
    let mut settings = load_settings_from(Path::new("storefront.toml"));

    if let Ok(v) = std::env::var("MARKET_SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("MARKET_PROFILE") {
        settings.profile = v;
    }
    if let Ok(v) = std::env::var("MARKET_DATA_DIR") {
        settings.data_dir = Some(PathBuf::from(v));
    }

    settings
}

pub fn load_settings_from(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("server_url") {
                settings.server_url = v.clone();
            }
            if let Some(v) = file_cfg.get("profile") {
                settings.profile = v.clone();
            }
            if let Some(v) = file_cfg.get("data_dir") {
                settings.data_dir = Some(PathBuf::from(v));
            }
        }
    }

    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn defaults_apply_when_no_file_is_present() {
        let settings = load_settings_from(Path::new("/nonexistent/storefront.toml"));
        assert_eq!(settings.server_url, "http://localhost:8080");
        assert_eq!(settings.profile, "default");
        assert!(settings.data_dir.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("farm_market_config_test_{suffix}.toml"));
        fs::write(
            &path,
            "server_url = \"https://market.example\"\nprofile = \"amar\"\n",
        )
        .expect("write config");

        let settings = load_settings_from(&path);
        assert_eq!(settings.server_url, "https://market.example");
        assert_eq!(settings.profile, "amar");

        let _ = fs::remove_file(&path);
    }
}
