use std::env;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 7070;
pub const DEFAULT_TEMPLATE_PATH: &str = "src/template.json";
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";
pub const DEFAULT_CUSTOM_HANDLER_PORT: u16 = 8080;

/// Process-wide settings, resolved once at startup and passed down read-only.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub template_path: PathBuf,
    pub templates_dir: PathBuf,
    /// Port the Azure Functions host expects the custom handler on.
    pub custom_handler_port: u16,
    /// Project that `build` packages; `template_path` is relative to it.
    pub project_root: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            templates_dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
            custom_handler_port: DEFAULT_CUSTOM_HANDLER_PORT,
            project_root: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: port_var("PORT", DEFAULT_PORT)?,
            template_path: env::var("TEMPLATE_PATH")
                .map_or_else(|_| PathBuf::from(DEFAULT_TEMPLATE_PATH), PathBuf::from),
            templates_dir: env::var("STARLESS_TEMPLATES_DIR")
                .map_or_else(|_| PathBuf::from(DEFAULT_TEMPLATES_DIR), PathBuf::from),
            custom_handler_port: port_var(
                "FUNCTIONS_CUSTOMHANDLER_PORT",
                DEFAULT_CUSTOM_HANDLER_PORT,
            )?,
            project_root: PathBuf::from("."),
        })
    }

    /// Base URL the local server announces in its route listing.
    #[must_use]
    pub fn local_base_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn port_var(name: &str, default: u16) -> Result<u16, String> {
    match env::var(name) {
        Ok(raw) => raw.parse::<u16>().map_err(|e| format!("{}: {}", name, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.port, 7070);
        assert_eq!(config.template_path, PathBuf::from("src/template.json"));
        assert_eq!(config.local_base_url(), "http://localhost:7070");
        assert_eq!(config.bind_address(), "0.0.0.0:7070");
        assert_eq!(config.custom_handler_port, 8080);
        assert_eq!(config.project_root, PathBuf::from("."));
    }
}
