//! `starless` command line.

pub mod options;
pub mod prompt;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use self::options::{option, parse_options};
use self::prompt::{FOLDER_QUESTION, PROJECT_QUESTION, Prompter};
use crate::build::{BuildOptions, Builder};
use crate::core::config::AppConfig;
use crate::errors::Result;
use crate::process::{CommandRunner, SystemRunner};
use crate::scaffold::{ProjectKind, Scaffolder};

/// Starless - scaffold, serve and package serverless TypeScript projects
#[derive(Debug, Parser)]
#[command(name = "starless", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a new project (interactive unless -project and -name are given)
    New {
        /// Free-form options, e.g. `-project starless-app -name my-app`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Serve the registered functions under /api/ on localhost
    Dev {
        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Package the project for AWS Lambda and Azure Functions
    Build {
        /// Project root containing package.json and src/template.json
        #[arg(long)]
        root: Option<PathBuf>,

        /// Skip layer packaging and Lambda translation
        #[arg(long)]
        skip_lambda: bool,

        /// Skip the azure_function project
        #[arg(long)]
        skip_azure: bool,
    },
}

/// Answers for `new`, taken from options first and prompted for otherwise.
///
/// # Errors
///
/// Returns an error if prompting fails or the project name is unknown.
pub fn resolve_new_args(
    args: &[String],
    prompter: &mut dyn Prompter,
) -> Result<(ProjectKind, String)> {
    let options = parse_options(args);
    let project = match option(&options, "project") {
        Some(name) => name.to_string(),
        None => {
            let choices: Vec<&str> = ProjectKind::ALL.iter().map(|k| k.name()).collect();
            prompter.select(PROJECT_QUESTION, &choices)?
        }
    };
    let project: ProjectKind = project.parse()?;
    let folder = match option(&options, "name") {
        Some(name) => name.to_string(),
        None => prompter.input(FOLDER_QUESTION)?,
    };
    Ok((project, folder))
}

/// # Errors
///
/// Returns the first error of the chosen command.
pub async fn run(cli: Cli, mut config: AppConfig, prompter: &mut dyn Prompter) -> Result<()> {
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    match cli.command {
        Commands::New { args } => {
            let (project, folder) = resolve_new_args(&args, prompter)?;
            let cwd = std::env::current_dir()?;
            Scaffolder::new(&config.templates_dir, runner)
                .generate(project, &folder, &cwd)
                .await?;
        }
        Commands::Dev { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            let table = crate::functions::route_table(&config)?;
            crate::server::serve(config, table).await?;
        }
        Commands::Build {
            root,
            skip_lambda,
            skip_azure,
        } => {
            if let Some(root) = root {
                config.project_root = root;
            }
            let report = Builder::new(&config.project_root, &config.template_path, runner)
                .run(BuildOptions {
                    skip_lambda,
                    skip_azure,
                })
                .await?;
            print_report(&config.project_root, &report);
        }
    }
    Ok(())
}

fn print_report(root: &Path, report: &crate::build::BuildReport) {
    let shown = |p: &Path| p.strip_prefix(root).unwrap_or(p).display().to_string();
    for zip in &report.layer_zips {
        println!("{} layer {}", "✔".green(), shown(zip));
    }
    for module in &report.translated {
        println!("{} lambda {}", "✔".green(), shown(module));
    }
    if let Some(project) = &report.azure_project {
        println!("{} azure {}", "✔".green(), shown(project));
    }
}
