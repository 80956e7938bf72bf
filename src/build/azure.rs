//! Generation of the `azure_function/` project from the project sources.

use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::translate::{relocate_for_azure, to_azure_source};
use crate::adapter::HandlerStyle;
use crate::azure::protocol::{REQUEST_BINDING, RESPONSE_BINDING};
use crate::errors::Result;
use crate::process::{CommandRunner, print_output};
use crate::template::FunctionDef;
use crate::utils::fs::{copy_tree, read_json, write_json};

pub const AZURE_PROJECT_DIR: &str = "azure_function";

/// A function to deploy, with its handler style already resolved.
#[derive(Debug, Clone)]
pub struct AzureFunction<'a> {
    pub def: &'a FunctionDef,
    pub style: HandlerStyle,
}

/// Recreates `<root>/azure_function` and fills it with one folder per
/// function.
///
/// # Errors
///
/// Returns an error if the project folder cannot be written. A failed
/// `func init` is printed and the remaining steps run against whatever it
/// left behind.
pub async fn build_azure_project(
    root: &Path,
    functions: &[AzureFunction<'_>],
    root_dependencies: &Map<String, Value>,
    runner: &dyn CommandRunner,
) -> Result<PathBuf> {
    let project = root.join(AZURE_PROJECT_DIR);
    if project.exists() {
        fs::remove_dir_all(&project)?;
    }
    let output = runner
        .run("func", &["init", AZURE_PROJECT_DIR, "--typescript", "--docker"], root)
        .await;
    print_output(&output);
    fs::create_dir_all(&project)?;

    let layers = root.join("src").join("layers");
    if layers.is_dir() {
        copy_tree(&layers, &project.join("layers"))?;
    }

    patch_tsconfig(&project.join("tsconfig.json"))?;
    replace_dependencies(&project.join("package.json"), root_dependencies)?;

    for function in functions {
        write_function(root, &project, function)?;
    }
    info!(project = %project.display(), functions = functions.len(), "Azure project ready");
    Ok(project)
}

fn write_function(root: &Path, project: &Path, function: &AzureFunction<'_>) -> Result<()> {
    let name = function.def.folder_name();
    let target = project.join(name);
    copy_tree(&root.join("src").join(&function.def.path), &target)?;

    let index = target.join("index.ts");
    if index.is_file() {
        let source = fs::read_to_string(&index)?;
        let source = match function.style {
            HandlerStyle::Lambda => to_azure_source(&source),
            HandlerStyle::Context => source,
        };
        fs::write(&index, relocate_for_azure(&source))?;
    } else {
        warn!(function = %name, "No index.ts in function folder");
    }

    write_json(
        &target.join("function.json"),
        &function_json(name, &function.def.methods),
    )
}

/// The `function.json` binding document for one HTTP function.
#[must_use]
pub fn function_json(name: &str, methods: &[String]) -> Value {
    let methods: Vec<String> = methods.iter().map(|m| m.to_lowercase()).collect();
    json!({
        "bindings": [
            {
                "authLevel": "anonymous",
                "type": "httpTrigger",
                "direction": "in",
                "name": REQUEST_BINDING,
                "methods": methods
            },
            {
                "type": "http",
                "direction": "out",
                "name": RESPONSE_BINDING
            }
        ],
        "scriptFile": format!("../dist/{name}/index.js")
    })
}

fn patch_tsconfig(path: &Path) -> Result<()> {
    let Ok(mut tsconfig) = read_json(path) else {
        warn!(path = %path.display(), "tsconfig.json not found, skipped");
        return Ok(());
    };
    if let Some(options) = tsconfig
        .get_mut("compilerOptions")
        .and_then(Value::as_object_mut)
    {
        options.insert("esModuleInterop".to_string(), Value::Bool(true));
    } else if let Some(root) = tsconfig.as_object_mut() {
        root.insert(
            "compilerOptions".to_string(),
            json!({ "esModuleInterop": true }),
        );
    }
    write_json(path, &tsconfig)
}

fn replace_dependencies(path: &Path, dependencies: &Map<String, Value>) -> Result<()> {
    let Ok(mut package) = read_json(path) else {
        warn!(path = %path.display(), "package.json not found, skipped");
        return Ok(());
    };
    if let Some(existing) = package.get_mut("dependencies") {
        *existing = Value::Object(dependencies.clone());
    }
    write_json(path, &package)
}
