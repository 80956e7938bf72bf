//! Packaging of a generated project for AWS Lambda and Azure Functions.
//!
//! Works on a project root containing `package.json`, `src/template.json`,
//! the TypeScript sources under `src/` and the compiled output under `dist/`.

pub mod azure;
pub mod layers;
pub mod translate;

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use self::azure::{AzureFunction, build_azure_project};
use self::layers::build_layer;
use self::translate::{detect_style, rewrite_requires, to_lambda_module};
use crate::adapter::HandlerStyle;
use crate::errors::Result;
use crate::process::CommandRunner;
use crate::template::{FunctionDef, TemplateDef};
use crate::utils::fs::read_json;

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    pub skip_lambda: bool,
    pub skip_azure: bool,
}

/// What a build produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub layer_zips: Vec<PathBuf>,
    pub translated: Vec<PathBuf>,
    pub azure_project: Option<PathBuf>,
}

pub struct Builder {
    root: PathBuf,
    template_path: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl Builder {
    /// `template_path` is resolved against `root` when relative.
    pub fn new(root: impl Into<PathBuf>, template_path: &Path, runner: Arc<dyn CommandRunner>) -> Self {
        let root = root.into();
        let template_path = root.join(template_path);
        Self {
            root,
            template_path,
            runner,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the template or root `package.json` cannot be
    /// read, or if any output cannot be written.
    pub async fn run(&self, options: BuildOptions) -> Result<BuildReport> {
        let template = TemplateDef::load(&self.template_path)?;
        let dependencies = root_dependencies(&read_json(&self.root.join("package.json"))?);
        let styles = self.resolve_styles(&template);
        let mut report = BuildReport::default();

        if !options.skip_lambda {
            let dist = self.root.join("dist");
            for (name, layer) in &template.layers {
                let zip = build_layer(&dist, name, layer, &dependencies, self.runner.as_ref()).await?;
                report.layer_zips.push(zip);
            }
            if let Some(build) = &template.build {
                for (def, style) in &styles {
                    let path = dist.join(&def.path).join("index.js");
                    if !path.is_file() {
                        warn!(path = %path.display(), "Compiled module missing, skipped");
                        continue;
                    }
                    let content = rewrite_requires(&fs::read_to_string(&path)?, &build.import_paths);
                    let content = match style {
                        HandlerStyle::Context => to_lambda_module(&content),
                        HandlerStyle::Lambda => content,
                    };
                    fs::write(&path, content)?;
                    report.translated.push(path);
                }
            }
        }

        if !options.skip_azure {
            let functions: Vec<AzureFunction<'_>> = styles
                .iter()
                .map(|(def, style)| AzureFunction { def: *def, style: *style })
                .collect();
            let project =
                build_azure_project(&self.root, &functions, &dependencies, self.runner.as_ref())
                    .await?;
            report.azure_project = Some(project);
        }

        info!(
            layers = report.layer_zips.len(),
            translated = report.translated.len(),
            azure = report.azure_project.is_some(),
            "Build finished"
        );
        Ok(report)
    }

    /// Declared style wins; otherwise the function's `index.ts` decides.
    fn resolve_styles<'t>(&self, template: &'t TemplateDef) -> Vec<(&'t FunctionDef, HandlerStyle)> {
        template
            .functions
            .values()
            .map(|def| {
                let style = def.style.unwrap_or_else(|| {
                    let source = self.root.join("src").join(&def.path).join("index.ts");
                    fs::read_to_string(&source).map_or_else(
                        |_| {
                            warn!(path = %source.display(), "Source missing, assuming lambda style");
                            HandlerStyle::Lambda
                        },
                        |s| detect_style(&s),
                    )
                });
                (def, style)
            })
            .collect()
    }
}

fn root_dependencies(package: &Value) -> Map<String, Value> {
    package
        .get("dependencies")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::RecordingRunner;
    use serde_json::json;

    fn project() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        let p = root.path();
        fs::create_dir_all(p.join("src/functions/hello")).unwrap();
        fs::create_dir_all(p.join("src/functions/azure-function-hello")).unwrap();
        fs::create_dir_all(p.join("dist/functions/hello")).unwrap();
        fs::create_dir_all(p.join("dist/functions/azure-function-hello")).unwrap();
        fs::create_dir_all(p.join("dist/layers/common")).unwrap();
        fs::write(
            p.join("package.json"),
            r#"{"name":"demo","dependencies":{"express":"^4.18.2"}}"#,
        )
        .unwrap();
        fs::write(
            p.join("src/template.json"),
            r#"{
                "functions": {
                    "hello": {"path": "functions/hello", "route": "hello", "methods": ["GET"]},
                    "azure-function-hello": {
                        "path": "functions/azure-function-hello",
                        "route": "azure-function-hello",
                        "methods": ["GET", "POST"]
                    }
                },
                "layers": {"common": {"path": "layers/common"}},
                "build": {"import_paths": {"../../layers/common": "/opt/nodejs/common"}}
            }"#,
        )
        .unwrap();
        fs::write(
            p.join("src/functions/hello/index.ts"),
            "export const handler = async () => ({ statusCode: 200, body: \"\" });",
        )
        .unwrap();
        fs::write(
            p.join("src/functions/azure-function-hello/index.ts"),
            "const httpTrigger = async function (context, req) {};\nexport default httpTrigger;",
        )
        .unwrap();
        fs::write(
            p.join("dist/functions/hello/index.js"),
            "const common_1 = require(\"../../layers/common\");\nexports.handler = handler;\n",
        )
        .unwrap();
        fs::write(
            p.join("dist/functions/azure-function-hello/index.js"),
            "const common_1 = require(\"../../layers/common\");\nconst httpTrigger = async function (context, req) {};\nexports.default = httpTrigger;\n",
        )
        .unwrap();
        root
    }

    #[tokio::test]
    async fn test_lambda_build_translates_and_packages() {
        let root = project();
        let runner = Arc::new(RecordingRunner::default());
        let builder = Builder::new(root.path(), Path::new("src/template.json"), runner.clone());

        let report = builder
            .run(BuildOptions { skip_lambda: false, skip_azure: true })
            .await
            .unwrap();

        assert_eq!(report.layer_zips, vec![root.path().join("dist/layers/common/common.zip")]);
        assert_eq!(report.translated.len(), 2);
        assert!(report.azure_project.is_none());

        let package = read_json(&root.path().join("dist/layers/common/nodejs/package.json")).unwrap();
        assert_eq!(package["dependencies"], json!({"express": "^4.18.2"}));

        let hello = fs::read_to_string(root.path().join("dist/functions/hello/index.js")).unwrap();
        assert!(hello.contains("require(\"/opt/nodejs/common\")"));
        assert!(!hello.contains("const handler = async (event)"));

        let context =
            fs::read_to_string(root.path().join("dist/functions/azure-function-hello/index.js"))
                .unwrap();
        assert!(context.contains("require(\"/opt/nodejs/common\")"));
        assert!(!context.contains("exports.default"));
        assert!(context.contains("await httpTrigger(context, req);"));
        assert_eq!(runner.calls(), vec!["npm i".to_string()]);
    }

    #[tokio::test]
    async fn test_azure_only_build() {
        let root = project();
        let runner = Arc::new(RecordingRunner::default());
        let builder = Builder::new(root.path(), Path::new("src/template.json"), runner.clone());

        let report = builder
            .run(BuildOptions { skip_lambda: true, skip_azure: false })
            .await
            .unwrap();

        let project = report.azure_project.unwrap();
        assert!(project.join("hello/function.json").is_file());
        let source = fs::read_to_string(project.join("hello/index.ts")).unwrap();
        assert!(source.contains("export default httpTrigger;"));
        assert!(report.layer_zips.is_empty());
        assert_eq!(
            runner.calls(),
            vec!["func init azure_function --typescript --docker".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_template_fails() {
        let root = tempfile::tempdir().unwrap();
        let builder = Builder::new(
            root.path(),
            Path::new("src/template.json"),
            Arc::new(RecordingRunner::default()),
        );
        assert!(builder.run(BuildOptions::default()).await.is_err());
    }
}
