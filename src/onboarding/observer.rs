use super::{OnboardingFailure, OnboardingState};

/// Receives every state transition of a run and its failure, if any.
///
/// Callbacks run inline on the onboarding task and must not block.
pub trait OnboardingObserver: Send + Sync {
    fn on_transition(&self, _from: OnboardingState, _to: OnboardingState) {}

    fn on_failure(&self, _failure: &OnboardingFailure) {}
}

/// Ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl OnboardingObserver for NoopObserver {}

/// Emits transitions and failures as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl OnboardingObserver for TracingObserver {
    fn on_transition(&self, from: OnboardingState, to: OnboardingState) {
        tracing::info!(target: "onboarding", %from, %to, "state transition");
    }

    fn on_failure(&self, failure: &OnboardingFailure) {
        tracing::error!(
            target: "onboarding",
            state = %failure.state,
            kind = ?failure.kind(),
            error = %failure.cause,
            "onboarding failed"
        );
    }
}
