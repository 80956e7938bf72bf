//! Sample functions served by the bundled binaries.

pub mod azure_hello;
pub mod common;
pub mod hello;

use tracing::info;

use crate::adapter::Handler;
use crate::core::config::AppConfig;
use crate::errors::Result;
use crate::routes::{HandlerRegistry, RouteTable};
use crate::template::TemplateDef;

/// Template definition matching [`registry`].
pub const SAMPLE_TEMPLATE: &str = include_str!("template.json");

#[must_use]
pub fn registry() -> HandlerRegistry {
    HandlerRegistry::new()
        .with("hello", Handler::lambda(hello::Hello))
        .with("azure-function-hello", Handler::context(azure_hello::AzureHello))
}

/// # Errors
///
/// Only fails if the bundled template is malformed.
pub fn sample_template() -> Result<TemplateDef> {
    TemplateDef::parse(SAMPLE_TEMPLATE)
}

/// Binds the registered functions to the project's `template.json`, or to the
/// bundled template when the project has none.
///
/// # Errors
///
/// Returns an error if the template is malformed or declares something the
/// registry cannot serve.
pub fn route_table(config: &AppConfig) -> Result<RouteTable> {
    let path = config.project_root.join(&config.template_path);
    let template = if path.is_file() {
        info!(template = %path.display(), "Loading template");
        TemplateDef::load(&path)?
    } else {
        info!("No template.json found, using the bundled sample");
        sample_template()?
    };
    RouteTable::build(&template, &registry())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::RouteTable;

    #[test]
    fn test_sample_template_binds() {
        let template = sample_template().unwrap();
        let table = RouteTable::build(&template, &registry()).unwrap();
        assert_eq!(table.routes().len(), 4);
    }

    #[test]
    fn test_route_table_falls_back_to_sample() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            project_root: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        let table = route_table(&config).unwrap();
        assert!(table.find_by_name("hello").is_some());
    }

    #[test]
    fn test_route_table_rejects_unknown_function() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(
            dir.path().join("src/template.json"),
            r#"{"functions": {"missing": {"path": "functions/missing", "route": "missing", "methods": ["GET"]}}}"#,
        )
        .unwrap();
        let config = AppConfig {
            project_root: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        assert!(route_table(&config).is_err());
    }
}
