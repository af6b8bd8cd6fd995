//! The per-candidate attempt seam
//!
//! Whatever "trying a source" means (an image load, an HTTP probe, a local file
//! check) is hidden behind `Attempt`. Transport errors are caught inside the
//! implementation and reported to the resolver only as pass or fail.

use std::future::Future;

use async_trait::async_trait;

/// Result of attempting a single candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The candidate is available
    Success,
    /// The candidate failed; the resolver moves on to the next one
    Failure,
}

impl AttemptOutcome {
    /// Returns true for `Success`
    pub fn is_success(self) -> bool {
        matches!(self, AttemptOutcome::Success)
    }
}

impl From<bool> for AttemptOutcome {
    fn from(ok: bool) -> Self {
        if ok {
            AttemptOutcome::Success
        } else {
            AttemptOutcome::Failure
        }
    }
}

/// Asynchronous availability check for one candidate source
#[async_trait]
pub trait Attempt<C>: Send + Sync {
    /// Tries `candidate` once; errors and timeouts are reported as `Failure`
    async fn attempt(&self, candidate: &C) -> AttemptOutcome;
}

/// Adapts an async closure `Fn(C) -> impl Future<Output = bool>` into an `Attempt`
pub struct FnAttempt<F> {
    f: F,
}

impl<F> FnAttempt<F> {
    /// Wraps `f`, which is called with an owned copy of each candidate
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<C, F, Fut> Attempt<C> for FnAttempt<F>
where
    C: Clone + Send + Sync + 'static,
    F: Fn(C) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    async fn attempt(&self, candidate: &C) -> AttemptOutcome {
        (self.f)(candidate.clone()).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_bool() {
        assert_eq!(AttemptOutcome::from(true), AttemptOutcome::Success);
        assert_eq!(AttemptOutcome::from(false), AttemptOutcome::Failure);
        assert!(AttemptOutcome::Success.is_success());
        assert!(!AttemptOutcome::Failure.is_success());
    }

    #[tokio::test]
    async fn test_fn_attempt_forwards_candidate() {
        let attempt =
            FnAttempt::new(|candidate: String| async move { candidate.ends_with(".png") });

        assert_eq!(
            attempt.attempt(&"https://b/xyz.png".to_string()).await,
            AttemptOutcome::Success
        );
        assert_eq!(
            attempt.attempt(&"https://b/xyz.svg".to_string()).await,
            AttemptOutcome::Failure
        );
    }
}
