//! Sequential subprocess execution for package installs and external tools.

use async_trait::async_trait;
use colored::Colorize;
use std::path::Path;
use tokio::process::Command;
use tracing::{error, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs one external command to completion.
///
/// Failures are reported in the returned output rather than as errors; callers
/// print them and carry on.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[&str], cwd: &Path) -> CommandOutput;
}

/// Spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str], cwd: &Path) -> CommandOutput {
        info!(program, args = ?args, cwd = %cwd.display(), "Running command");
        match Command::new(program).args(args).current_dir(cwd).output().await {
            Ok(output) => CommandOutput {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
            Err(e) => {
                error!(program, "Failed to spawn command: {}", e);
                CommandOutput {
                    success: false,
                    stdout: String::new(),
                    stderr: format!("failed to run {program}: {e}"),
                }
            }
        }
    }
}

/// Prints captured output the way the scaffolder reports installs: stdout as
/// is, stderr in red.
pub fn print_output(output: &CommandOutput) {
    if !output.stdout.trim().is_empty() {
        println!("{}", output.stdout);
    }
    if !output.stderr.trim().is_empty() {
        println!("{}", output.stderr.red());
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every command and answers with canned output.
    #[derive(Default)]
    pub struct RecordingRunner {
        pub calls: Mutex<Vec<String>>,
        pub fail: bool,
    }

    impl RecordingRunner {
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, program: &str, args: &[&str], cwd: &Path) -> CommandOutput {
            let line = format!("{} {}", program, args.join(" "));
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(line.clone());
            }
            if !self.fail && line == "npm init -y" {
                let _ = std::fs::write(
                    cwd.join("package.json"),
                    r#"{"name":"generated","version":"1.0.0","scripts":{"test":"echo"}}"#,
                );
            }
            CommandOutput {
                success: !self.fail,
                stdout: String::new(),
                stderr: if self.fail { "npm ERR!".to_string() } else { String::new() },
            }
        }
    }
}
