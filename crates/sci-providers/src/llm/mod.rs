//! Completion providers.
//!
//! Every provider enforces the per-tier request deadline (fast 60 s,
//! complex 120 s, alt 90 s) and retries a timed-out call once before
//! surfacing the timeout with its retry count.

/// Echo provider for tests and dry runs
pub mod null;
/// Ollama local completion API
pub mod ollama;
/// OpenAI-compatible chat completions (OpenAI and ElectronHub)
pub mod openai_compat;

pub use null::NullLlmProvider;
pub use ollama::OllamaLlmProvider;
pub use openai_compat::OpenAiCompatLlmProvider;

use std::future::Future;

use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::LlmKind;

/// How many times a timed-out request is retried before giving up.
const TIMEOUT_RETRIES: u32 = 1;

/// Run a completion attempt under the tier's deadline, retrying timeouts.
pub(crate) async fn complete_with_deadline<F, Fut>(
    model: &str,
    kind: LlmKind,
    attempt: F,
) -> Result<String>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let deadline = kind.timeout();
    for _ in 0..=TIMEOUT_RETRIES {
        match tokio::time::timeout(deadline, attempt()).await {
            Ok(result) => return result,
            Err(_elapsed) => {}
        }
    }
    Err(Error::LlmTimeout {
        model: model.to_owned(),
        retries: TIMEOUT_RETRIES,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_attempts_pass_through() {
        let result = complete_with_deadline("m", LlmKind::Fast, || async {
            Ok("answer".to_owned())
        })
        .await;
        assert_eq!(result.expect("completion"), "answer");
    }

    #[tokio::test]
    async fn errors_are_not_retried() {
        let result = complete_with_deadline("m", LlmKind::Fast, || async {
            Err(Error::llm("boom"))
        })
        .await;
        assert!(matches!(result, Err(Error::Llm { .. })));
    }
}
