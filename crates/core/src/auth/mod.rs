mod command;
mod static_store;
mod traits;
mod types;

pub use command::*;
pub use static_store::*;
pub use traits::*;
pub use types::*;

use crate::config::CaptchaConfig;

/// Factory function to create the CAPTCHA solver from config.
/// Called once at startup; a failure here is fatal for the process.
pub fn create_captcha_solver(config: &CaptchaConfig) -> Result<Box<dyn CaptchaSolver>, CaptchaError> {
    Ok(Box::new(CommandCaptchaSolver::load(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_create_captcha_solver_command() {
        let model = NamedTempFile::new().unwrap();
        let config = CaptchaConfig {
            command: PathBuf::from("decaptcha"),
            args: Vec::new(),
            model_path: model.path().to_path_buf(),
        };
        let solver = create_captcha_solver(&config).unwrap();
        assert_eq!(solver.name(), "command");
    }

    #[test]
    fn test_create_captcha_solver_missing_model() {
        let config = CaptchaConfig {
            command: PathBuf::from("decaptcha"),
            args: Vec::new(),
            model_path: PathBuf::from("/nonexistent/captcha_classifier.pkl"),
        };
        let result = create_captcha_solver(&config);
        assert!(matches!(result, Err(CaptchaError::ModelNotFound { .. })));
    }
}
