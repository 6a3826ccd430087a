//! Summarization through the Codex CLI agent.
//!
//! The agent runs as a read-only sandboxed subprocess with the prompt on
//! stdin and the final message written to a file in the job directory.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{prompt_body, SummarizeError, SummarizeResult, Summarizer, ANALYST_FRAMING};
use crate::config::SummarizerSettings;

/// Auth files the agent accepts in place of an API key.
const CODEX_AUTH_FILES: &[&str] = &["auth.json", "config.toml", "config.json"];

/// Name of the output file the agent writes into the job directory.
const OUTPUT_FILENAME: &str = "codex_summary.txt";

/// CLI agent summarizer.
pub struct CodexCli {
    runner: String,
    package: String,
    model: String,
    prompt_template: String,
    output_dir: PathBuf,
}

impl CodexCli {
    /// Create a summarizer writing its output file into `output_dir`.
    pub fn new(settings: &SummarizerSettings, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner: settings.codex_runner.clone(),
            package: settings.codex_package.clone(),
            model: settings.codex_model.clone(),
            prompt_template: settings.prompt.clone(),
            output_dir: output_dir.into(),
        }
    }

    /// Fail fast if the runner or credentials are missing.
    fn preflight(&self) -> SummarizeResult<()> {
        if !runner_on_path(&self.runner) {
            return Err(SummarizeError::RunnerMissing {
                runner: self.runner.clone(),
            });
        }

        if std::env::var("OPENAI_API_KEY").is_ok() {
            return Ok(());
        }

        if let Some(home) = dirs::home_dir() {
            let codex_dir = home.join(".codex");
            for filename in CODEX_AUTH_FILES {
                if codex_dir.join(filename).exists() {
                    return Ok(());
                }
            }
        }

        Err(SummarizeError::CredentialsMissing {
            runner: self.runner.clone(),
            package: self.package.clone(),
            env_var: "OPENAI_API_KEY".to_string(),
        })
    }

    fn build_prompt(&self, transcript: &str) -> String {
        format!(
            "{}\nFollow the format exactly and keep the response concise.\n{}\n\nReturn only the summary in markdown. Do not include the transcript, code fences, or extra commentary.",
            ANALYST_FRAMING,
            prompt_body(&self.prompt_template, transcript)
        )
    }
}

impl Summarizer for CodexCli {
    fn summarize(
        &self,
        transcript: &str,
        _title: &str,
        _canonical_url: &str,
    ) -> SummarizeResult<String> {
        self.preflight()?;

        let output_path = self.output_dir.join(OUTPUT_FILENAME);
        if output_path.exists() {
            std::fs::remove_file(&output_path)?;
        }

        let full_prompt = self.build_prompt(transcript);
        tracing::debug!(runner = %self.runner, model = %self.model, "invoking CLI summarizer");

        let mut child = Command::new(&self.runner)
            .arg(&self.package)
            .arg("exec")
            .args(["--sandbox", "read-only"])
            .arg("--skip-git-repo-check")
            .arg("--output-last-message")
            .arg(&output_path)
            .args(["-m", &self.model])
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SummarizeError::ExecutionFailed {
                tool: self.runner.clone(),
                message: e.to_string(),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(full_prompt.as_bytes())?;
            drop(stdin); // close pipe to signal EOF
        }

        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(SummarizeError::CommandFailed {
                tool: self.runner.clone(),
                exit_code: output.status.code().unwrap_or(-1),
                message: failure_detail(&output),
            });
        }

        if !output_path.exists() {
            return Err(SummarizeError::OutputMissing(output_path));
        }

        let summary = std::fs::read_to_string(&output_path)?;
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(SummarizeError::EmptyResponse);
        }

        Ok(summary.to_string())
    }
}

/// Check whether a runner resolves through PATH (or exists as a path).
fn runner_on_path(runner: &str) -> bool {
    if runner.contains(std::path::MAIN_SEPARATOR) {
        return Path::new(runner).exists();
    }
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| dir.join(runner).is_file())
}

fn failure_detail(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }
    "No error output captured.".to_string()
}
