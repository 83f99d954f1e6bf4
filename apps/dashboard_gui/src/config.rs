use std::{collections::HashMap, fs};

/// Runtime settings for the dashboard shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub namespace: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:5810".into(),
            namespace: "/SmartDashboard/".into(),
        }
    }
}

/// Layered settings: defaults, then `dashboard.toml`, then environment
/// variables, then command-line overrides.
pub fn load_settings(cli_server_url: Option<String>, cli_namespace: Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("dashboard.toml") {
        apply_file_layer(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("DASHBOARD_SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("DASHBOARD_NAMESPACE") {
        settings.namespace = v;
    }

    if let Some(v) = cli_server_url {
        settings.server_url = v;
    }
    if let Some(v) = cli_namespace {
        settings.namespace = v;
    }

    settings
}

fn apply_file_layer(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("server_url") {
            settings.server_url = v.clone();
        }
        if let Some(v) = file_cfg.get("namespace") {
            settings.namespace = v.clone();
        }
    }
}
