//! `template.json`: the functions, layers and build settings of a project.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::adapter::{HandlerStyle, HttpMethod};
use crate::errors::{Result, StarlessError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateDef {
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionDef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub layers: BTreeMap<String, LayerDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    /// Source folder of the function relative to `src`, e.g. `functions/hello`.
    pub path: String,
    /// Route below `/api/`.
    pub route: String,
    pub methods: Vec<String>,
    /// Calling convention; detected from the source when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<HandlerStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDef {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildDef {
    /// `require("<key>` prefixes rewritten to `require("<value>` in emitted modules.
    #[serde(default)]
    pub import_paths: BTreeMap<String, String>,
}

impl TemplateDef {
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid template.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StarlessError::Template(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&raw)
    }

    /// # Errors
    ///
    /// Returns an error if `raw` is not a valid template document.
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| StarlessError::Template(e.to_string()))
    }
}

impl FunctionDef {
    /// # Errors
    ///
    /// Returns `UnsupportedMethod` for the first declared method that is not
    /// one of GET/POST/PUT/PATCH/DELETE.
    pub fn parsed_methods(&self) -> Result<Vec<HttpMethod>> {
        self.methods.iter().map(|m| m.parse()).collect()
    }

    /// Last segment of the source path, used as the deployed function name.
    #[must_use]
    pub fn folder_name(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.path)
    }
}
