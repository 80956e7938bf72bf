//! Project scaffolding.
//!
//! Generates a new project folder from `<templates>/<project>/`: compiler
//! configuration, sources, npm dependencies, scripts and ignore files.

pub mod project;

pub use self::project::{BannerCommand, ProjectKind};

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::{Result, StarlessError};
use crate::process::{CommandRunner, print_output};
use crate::utils::fs::{copy_tree, read_json, write_json};

pub struct Scaffolder {
    templates_dir: PathBuf,
    runner: Arc<dyn CommandRunner>,
    show_progress: bool,
}

impl Scaffolder {
    pub fn new(templates_dir: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            runner,
            show_progress: true,
        }
    }

    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Generates `project` into `<cwd>/<folder_name>` and returns the new
    /// folder's path.
    ///
    /// # Errors
    ///
    /// `FolderExists` when the target is already present (nothing is
    /// written), `Template` when the project template has no `src` folder,
    /// or any I/O error while writing files. Failed npm commands are printed
    /// and do not stop generation.
    pub async fn generate(&self, project: ProjectKind, folder_name: &str, cwd: &Path) -> Result<PathBuf> {
        let folder_path = cwd.join(folder_name);
        if folder_path.exists() {
            return Err(StarlessError::FolderExists(folder_path.display().to_string()));
        }
        let template_root = self.templates_dir.join(project.name());
        let template_src = template_root.join("src");
        if !template_src.is_dir() {
            return Err(StarlessError::Template(format!(
                "No template sources at {}",
                template_src.display()
            )));
        }

        info!(%project, folder = %folder_path.display(), "Scaffolding project");
        fs::create_dir_all(&folder_path)?;

        let spinner = self.spinner(format!("Scaffolding {project}"));
        write_json(&folder_path.join("tsconfig.json"), &project.tsconfig())?;
        copy_tree(&template_src, &folder_path.join("src"))?;
        for filename in project.extra_files() {
            let source = template_root.join(filename);
            if source.is_file() {
                fs::copy(&source, folder_path.join(filename))?;
            } else {
                warn!(file = %source.display(), "Template file missing, skipped");
            }
        }
        spinner.finish_with_message(format!("{} Scaffolding {project}", "✔".green()));

        let spinner = self.spinner("Installing dependencies".to_string());
        self.install(project, &folder_path).await;
        write_package_json(project, &folder_path)?;
        if let Some(contents) = project.dockerignore() {
            fs::write(folder_path.join(".dockerignore"), contents)?;
        }
        fs::write(folder_path.join(".gitignore"), project.gitignore())?;
        spinner.finish_with_message(format!("{} Installing dependencies", "✔".green()));

        print_banner(project, folder_name, &folder_path);
        Ok(folder_path)
    }

    async fn install(&self, project: ProjectKind, folder_path: &Path) {
        let init = self.runner.run("npm", &["init", "-y"], folder_path).await;
        if !init.success {
            print_output(&init);
        }
        let output = self.runner.run("npm", project.install_args(), folder_path).await;
        print_output(&output);
        if let Some((program, args)) = project.post_install() {
            let output = self.runner.run(program, args, folder_path).await;
            if !output.success {
                print_output(&output);
            }
        }
    }

    fn spinner(&self, message: String) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// Sets the project's `scripts` (and `bin`) on whatever `npm init` produced.
fn write_package_json(project: ProjectKind, folder_path: &Path) -> Result<()> {
    let path = folder_path.join("package.json");
    let mut package = match read_json(&path) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            warn!(path = %path.display(), "No usable package.json, writing a fresh one");
            Map::new()
        }
    };
    package.insert("scripts".to_string(), project.scripts());
    if let Some(bin) = project.bin() {
        package.insert("bin".to_string(), Value::String(bin.to_string()));
    }
    write_json(&path, &Value::Object(package))
}

fn print_banner(project: ProjectKind, folder_name: &str, folder_path: &Path) {
    println!(
        "\nSuccess! Created {} at {}\n",
        folder_name,
        folder_path.display()
    );
    println!("Inside that directory, you can run several commands: \n");
    for line in project.banner() {
        println!("  * {} : {}\n", line.command.green(), line.description);
    }
    println!("Happy hacking!\n");
}
