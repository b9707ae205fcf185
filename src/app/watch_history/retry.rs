use std::thread;
use std::time::Duration;

use crate::http::Transport;

use super::DeleteError;
use super::api::{
    REMOVE_ACTIVITY_MUTATION, REMOVE_ACTIVITY_OPERATION, RetryDirective,
    inspect_mutation_response, remove_activity_variables,
};

const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

pub(crate) trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub(crate) struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub(crate) default_retry_after: Duration,
    // None: retry for as long as the server keeps rate limiting
    pub(crate) max_rate_limit_retries: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            default_retry_after: DEFAULT_RETRY_AFTER,
            max_rate_limit_retries: None,
        }
    }
}

/// Only rate-limit errors are retried; anything else is returned after one attempt.
pub(crate) fn delete_with_retry<T: Transport + ?Sized>(
    transport: &T,
    sleeper: &dyn Sleeper,
    policy: &RetryPolicy,
    entry_id: &str,
) -> Result<(), DeleteError> {
    let variables = remove_activity_variables(entry_id);
    let mut retries = 0_u32;

    loop {
        let response = transport
            .execute(
                REMOVE_ACTIVITY_MUTATION,
                variables.clone(),
                REMOVE_ACTIVITY_OPERATION,
            )
            .map_err(|err| {
                tracing::error!(id = entry_id, error = %err, "error deleting activity");
                DeleteError::Transport(err)
            })?;

        match inspect_mutation_response(response, policy.default_retry_after) {
            RetryDirective::Proceed(result) => {
                tracing::info!(id = entry_id, %result, "deleted activity");
                return Ok(());
            }
            RetryDirective::RateLimited(wait) => {
                if let Some(max) = policy.max_rate_limit_retries
                    && retries >= max
                {
                    tracing::error!(id = entry_id, retries, "giving up after rate limits");
                    return Err(DeleteError::RateLimitExhausted { retries });
                }
                retries += 1;
                tracing::warn!(
                    id = entry_id,
                    retry_after_secs = wait.as_secs_f64(),
                    attempt = retries,
                    "rate limit exceeded, waiting before retry"
                );
                sleeper.sleep(wait);
            }
            RetryDirective::Fatal(detail) => {
                tracing::error!(id = entry_id, errors = %detail, "failed to delete activity");
                return Err(DeleteError::Api(detail));
            }
        }
    }
}
