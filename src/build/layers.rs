//! Shared dependency layers: `dist/<layer>/nodejs` with its own
//! `node_modules`, zipped for upload.

use serde_json::{Map, Value, json};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::FileOptions;

use crate::errors::{Result, StarlessError};
use crate::process::{CommandRunner, print_output};
use crate::template::LayerDef;
use crate::utils::fs::write_json;

/// Prepares one layer under `dist` and returns the path of its zip.
///
/// The layer's own `dependencies` win over the project's root dependencies.
///
/// # Errors
///
/// Returns an error if the layer folder, its `package.json` or the zip
/// cannot be written. A failed `npm i` is printed and does not stop the
/// build.
pub async fn build_layer(
    dist: &Path,
    name: &str,
    layer: &LayerDef,
    root_dependencies: &Map<String, Value>,
    runner: &dyn CommandRunner,
) -> Result<PathBuf> {
    let layer_dir = dist.join(&layer.path);
    let nodejs = layer_dir.join("nodejs");
    fs::create_dir_all(&nodejs)?;

    let dependencies = layer.dependencies.as_ref().unwrap_or(root_dependencies);
    write_json(
        &nodejs.join("package.json"),
        &json!({ "dependencies": dependencies }),
    )?;

    let output = runner.run("npm", &["i"], &nodejs).await;
    print_output(&output);

    let zip_path = layer_dir.join(format!("{name}.zip"));
    if zip_path.exists() {
        fs::remove_file(&zip_path)?;
    }
    let entries = zip_dir(&layer_dir, &zip_path)?;
    info!(layer = %name, zip = %zip_path.display(), entries, "Layer packaged");
    Ok(zip_path)
}

/// Zips everything below `dir` into `dest`, skipping `dest` itself.
/// Entry names are relative to `dir` with `/` separators.
///
/// # Errors
///
/// Returns an error if a file cannot be read or the archive cannot be written.
pub fn zip_dir(dir: &Path, dest: &Path) -> Result<usize> {
    // Collect first so the archive being written is never walked.
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .map(walkdir::DirEntry::into_path)
        .filter(|p| p != dest && p != dir)
        .collect();
    paths.sort();

    let file = File::create(dest)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::<()>::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    let dir_options = options.unix_permissions(0o755);

    let mut entries = 0;
    let mut buffer = Vec::new();
    for path in paths {
        let name = entry_name(dir, &path)?;
        if path.is_dir() {
            zip.add_directory(format!("{name}/"), dir_options)?;
        } else {
            buffer.clear();
            File::open(&path)?.read_to_end(&mut buffer)?;
            zip.start_file(name, options)?;
            zip.write_all(&buffer)?;
        }
        entries += 1;
    }
    zip.finish()?;
    Ok(entries)
}

fn entry_name(base: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(base)
        .map_err(|e| StarlessError::Config(e.to_string()))?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}
