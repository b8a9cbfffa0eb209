use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::RetryPolicy;
use crate::error::PublishError;

/// Run `attempt` with a per-attempt deadline, retrying transient failures
/// with backoff. Returns the final result and the number of attempts made.
pub(crate) async fn with_retry<T, F, Fut>(
    operation: &str,
    policy: &RetryPolicy,
    timeout: Duration,
    mut attempt: F,
) -> (Result<T, PublishError>, u32)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PublishError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut made = 0;
    loop {
        made += 1;
        let result = match tokio::time::timeout(timeout, attempt()).await {
            Ok(result) => result,
            Err(_) => Err(PublishError::Timeout {
                operation: operation.to_string(),
                after: timeout,
            }),
        };
        match result {
            Err(e) if e.is_transient() && made < max_attempts => {
                let delay = policy.backoff(made);
                warn!(
                    operation,
                    attempt = made,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            other => return (other, made),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let (result, attempts) = with_retry("op", &fast_policy(3), Duration::from_secs(1), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(PublishError::Timeout {
                        operation: "op".into(),
                        after: Duration::ZERO,
                    })
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn does_not_retry_file_system_errors() {
        let calls = AtomicU32::new(0);
        let (result, attempts) =
            with_retry::<(), _, _>("op", &fast_policy(5), Duration::from_secs(1), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(PublishError::FileSystem {
                        path: "/gone".into(),
                        source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
                    })
                }
            })
            .await;
        assert!(matches!(result, Err(PublishError::FileSystem { .. })));
        assert_eq!(attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn hung_attempt_times_out() {
        let (result, attempts) = with_retry::<(), _, _>(
            "upload www/slow.bin",
            &fast_policy(1),
            Duration::from_millis(20),
            || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
        )
        .await;
        match result {
            Err(PublishError::Timeout { operation, after }) => {
                assert_eq!(operation, "upload www/slow.bin");
                assert_eq!(after, Duration::from_millis(20));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(attempts, 1);
    }
}
