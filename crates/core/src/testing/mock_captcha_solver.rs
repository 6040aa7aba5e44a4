//! Mock CAPTCHA solver for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::{CaptchaError, CaptchaSolver};

/// Mock implementation of the CaptchaSolver trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable answer
/// - Record the images it was asked to decode
/// - Fail on demand
///
/// # Example
///
/// ```rust,ignore
/// use snatcher_core::testing::MockCaptchaSolver;
///
/// let solver = MockCaptchaSolver::with_answer("x7k2");
/// let text = solver.decode(b"png bytes").await?;
/// assert_eq!(text, "x7k2");
/// assert_eq!(solver.decode_count().await, 1);
/// ```
#[derive(Clone)]
pub struct MockCaptchaSolver {
    answer: Arc<RwLock<String>>,
    images: Arc<RwLock<Vec<Vec<u8>>>>,
    /// If set, the next decode will fail with this message.
    next_error: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for MockCaptchaSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCaptchaSolver")
            .field("answer", &"<answer>")
            .field("images", &"<images>")
            .field("next_error", &"<next_error>")
            .finish()
    }
}

impl Default for MockCaptchaSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCaptchaSolver {
    /// Create a mock solver answering "abcd".
    pub fn new() -> Self {
        Self::with_answer("abcd")
    }

    /// Create a mock solver with a fixed answer.
    pub fn with_answer(answer: &str) -> Self {
        Self {
            answer: Arc::new(RwLock::new(answer.to_string())),
            images: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Change the answer for subsequent decodes.
    pub async fn set_answer(&self, answer: &str) {
        *self.answer.write().await = answer.to_string();
    }

    /// Configure the next decode to fail.
    pub async fn set_next_error(&self, message: &str) {
        *self.next_error.write().await = Some(message.to_string());
    }

    /// Images passed to `decode`, in call order.
    pub async fn recorded_images(&self) -> Vec<Vec<u8>> {
        self.images.read().await.clone()
    }

    /// Number of decode calls made.
    pub async fn decode_count(&self) -> usize {
        self.images.read().await.len()
    }
}

#[async_trait]
impl CaptchaSolver for MockCaptchaSolver {
    async fn decode(&self, image: &[u8]) -> Result<String, CaptchaError> {
        self.images.write().await.push(image.to_vec());

        if let Some(message) = self.next_error.write().await.take() {
            return Err(CaptchaError::SolverFailed(message));
        }

        Ok(self.answer.read().await.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
