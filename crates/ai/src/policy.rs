use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::model::{GenerateRequest, LanguageModel};
use crate::result::AiError;

/// Timeout and retry policy for one language-model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePolicy {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Extra attempts after the first one, for retryable failures only.
    pub max_retries: u32,
    pub base_backoff: Duration,
    /// Wall-clock bound across all attempts, including backoff.
    pub total_budget: Duration,
}

impl Default for ServicePolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            max_retries: 1,
            base_backoff: Duration::from_millis(250),
            total_budget: Duration::from_secs(45),
        }
    }
}

impl ServicePolicy {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = base_backoff;
        self
    }

    pub fn with_total_budget(mut self, total_budget: Duration) -> Self {
        self.total_budget = total_budget;
        self
    }
}

/// Run one generation under `policy`.
///
/// - every attempt is bounded by `timeout` (and by what is left of `total_budget`)
/// - `Unavailable`/`Timeout` failures are retried with exponential backoff
/// - other failures return immediately
pub async fn call_model(
    model: &dyn LanguageModel,
    request: &GenerateRequest,
    policy: &ServicePolicy,
) -> Result<String, AiError> {
    let started = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        let remaining = policy.total_budget.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return Err(AiError::Timeout(policy.total_budget));
        }
        let limit = policy.timeout.min(remaining);
        let attempt_request = GenerateRequest {
            timeout: limit,
            ..request.clone()
        };

        let outcome = match tokio::time::timeout(limit, model.generate(&attempt_request)).await {
            Ok(result) => result,
            Err(_) => Err(AiError::Timeout(limit)),
        };

        match outcome {
            Ok(text) => {
                debug!(model_ref = %request.model_ref, attempt, "language model call succeeded");
                return Ok(text);
            }
            Err(e) if e.is_retryable() && attempt <= policy.max_retries => {
                let wait = backoff(policy.base_backoff, attempt);
                if started.elapsed() + wait >= policy.total_budget {
                    warn!(
                        model_ref = %request.model_ref,
                        attempt,
                        error = %e,
                        "latency budget exhausted; not retrying"
                    );
                    return Err(e);
                }
                warn!(
                    model_ref = %request.model_ref,
                    attempt,
                    error = %e,
                    backoff_ms = wait.as_millis() as u64,
                    "language model call failed; retrying"
                );
                tokio::time::sleep(wait).await;
            }
            Err(e) => {
                warn!(
                    model_ref = %request.model_ref,
                    attempt,
                    error = %e,
                    "language model call failed"
                );
                return Err(e);
            }
        }
    }
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    // base * 2^(attempt-1), capped at 10s.
    let pow = 1u32 << attempt.saturating_sub(1).min(10);
    let ms = base.as_millis().saturating_mul(pow as u128);
    Duration::from_millis(ms.min(10_000) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{FailingModel, ScriptedModel, SlowModel};

    fn request() -> GenerateRequest {
        GenerateRequest::new("test-model", "hello")
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let base = Duration::from_millis(250);
        assert_eq!(backoff(base, 1), Duration::from_millis(250));
        assert_eq!(backoff(base, 2), Duration::from_millis(500));
        assert_eq!(backoff(base, 3), Duration::from_millis(1000));
        assert_eq!(backoff(base, 30), Duration::from_millis(10_000));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_once_after_transient_failure() {
        let model = ScriptedModel::new([
            Err(AiError::Unavailable("502".to_string())),
            Ok("fine".to_string()),
        ]);
        let out = call_model(&model, &request(), &ServicePolicy::default()).await;
        assert_eq!(out.unwrap(), "fine");
        assert_eq!(model.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_bounded_retries() {
        let model = ScriptedModel::new([
            Err(AiError::Unavailable("502".to_string())),
            Err(AiError::Unavailable("503".to_string())),
            Ok("too late".to_string()),
        ]);
        let err = call_model(&model, &request(), &ServicePolicy::default())
            .await
            .unwrap_err();
        assert_eq!(err, AiError::Unavailable("503".to_string()));
        assert_eq!(model.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_output_is_not_retried() {
        let model = FailingModel::new(AiError::InvalidOutput("garbage".to_string()));
        let err = call_model(&model, &request(), &ServicePolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::InvalidOutput(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_times_out() {
        let model = SlowModel::new(Duration::from_secs(60), "late");
        let policy = ServicePolicy::default()
            .with_timeout(Duration::from_secs(1))
            .with_max_retries(0);
        let err = call_model(&model, &request(), &policy).await.unwrap_err();
        assert_eq!(err, AiError::Timeout(Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn total_budget_bounds_all_attempts() {
        let model = SlowModel::new(Duration::from_secs(60), "late");
        let policy = ServicePolicy::default()
            .with_timeout(Duration::from_secs(10))
            .with_max_retries(5)
            .with_total_budget(Duration::from_secs(15));
        let started = Instant::now();
        let err = call_model(&model, &request(), &policy).await.unwrap_err();
        assert!(matches!(err, AiError::Timeout(_)));
        assert!(started.elapsed() <= Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn attempt_sees_effective_timeout() {
        let model = ScriptedModel::new([Ok("ok".to_string())]);
        let policy = ServicePolicy::default().with_timeout(Duration::from_secs(3));
        call_model(&model, &request(), &policy).await.unwrap();
        assert_eq!(model.calls()[0].timeout, Duration::from_secs(3));
    }
}
