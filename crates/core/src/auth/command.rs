//! CAPTCHA solver backed by an external classifier program.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::CaptchaConfig;

use super::{CaptchaError, CaptchaSolver};

/// Runs `command [args..] <model_path>` once per CAPTCHA, feeding the image
/// on stdin and reading the recognized text from stdout.
pub struct CommandCaptchaSolver {
    command: PathBuf,
    args: Vec<String>,
    model_path: PathBuf,
}

impl CommandCaptchaSolver {
    /// Load the solver. Fails if the model artifact is missing.
    pub fn load(config: &CaptchaConfig) -> Result<Self, CaptchaError> {
        if !config.model_path.is_file() {
            return Err(CaptchaError::ModelNotFound {
                path: config.model_path.clone(),
            });
        }

        debug!(
            command = %config.command.display(),
            model = %config.model_path.display(),
            "Loaded CAPTCHA solver"
        );

        Ok(Self {
            command: config.command.clone(),
            args: config.args.clone(),
            model_path: config.model_path.clone(),
        })
    }
}

#[async_trait]
impl CaptchaSolver for CommandCaptchaSolver {
    async fn decode(&self, image: &[u8]) -> Result<String, CaptchaError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .arg(&self.model_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CaptchaError::SolverNotFound {
                        path: self.command.clone(),
                    }
                } else {
                    CaptchaError::Io(e)
                }
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CaptchaError::SolverFailed("stdin not captured".to_string()))?;

        let feed = async move {
            let result = stdin.write_all(image).await;
            drop(stdin);
            result
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;

        // A solver may stop reading once it has what it needs.
        if let Err(e) = fed {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(CaptchaError::Io(e));
            }
        }

        if !output.status.success() {
            return Err(CaptchaError::SolverFailed(format!(
                "{} exited with {}: {}",
                self.command.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(CaptchaError::EmptyAnswer);
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        "command"
    }
}
