//! Injectable failure policies
//!
//! Both the mock provider and the cache's secondary check ask a
//! [`FailurePolicy`] whether the current call should fail. Production uses
//! [`RandomFailure`]; tests pick a deterministic policy.

use std::collections::{HashSet, VecDeque};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::tier::FetchKind;

/// Decides whether a given call should fail
pub trait FailurePolicy: Send + Sync {
    fn should_fail(&self, kind: FetchKind) -> bool;
}

/// Never fails
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverFail;

impl FailurePolicy for NeverFail {
    fn should_fail(&self, _kind: FetchKind) -> bool {
        false
    }
}

/// Always fails
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFail;

impl FailurePolicy for AlwaysFail {
    fn should_fail(&self, _kind: FetchKind) -> bool {
        true
    }
}

/// Fails with a fixed probability using the thread-local RNG
#[derive(Debug, Clone, Copy)]
pub struct RandomFailure {
    probability: f64,
}

impl RandomFailure {
    pub fn new(probability: f64) -> Self {
        Self {
            probability: clamp_probability(probability),
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl FailurePolicy for RandomFailure {
    fn should_fail(&self, _kind: FetchKind) -> bool {
        self.probability > 0.0 && rand::rng().random::<f64>() < self.probability
    }
}

/// Fails with a fixed probability drawn from a seeded RNG
///
/// Two policies built with the same seed produce the same decision sequence.
#[derive(Debug)]
pub struct SeededFailure {
    probability: f64,
    rng: Mutex<StdRng>,
}

impl SeededFailure {
    pub fn new(probability: f64, seed: u64) -> Self {
        Self {
            probability: clamp_probability(probability),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl FailurePolicy for SeededFailure {
    fn should_fail(&self, _kind: FetchKind) -> bool {
        // Always draw so the sequence does not depend on the probability.
        let roll = self.rng.lock().random::<f64>();
        roll < self.probability
    }
}

/// Replays pre-recorded decisions, then never fails
#[derive(Debug, Default)]
pub struct ScriptedFailure {
    decisions: Mutex<VecDeque<bool>>,
}

impl ScriptedFailure {
    pub fn new(decisions: impl IntoIterator<Item = bool>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into_iter().collect()),
        }
    }

    /// Decisions not yet consumed
    pub fn remaining(&self) -> usize {
        self.decisions.lock().len()
    }
}

impl FailurePolicy for ScriptedFailure {
    fn should_fail(&self, _kind: FetchKind) -> bool {
        self.decisions.lock().pop_front().unwrap_or(false)
    }
}

/// Fails for the listed kinds only
#[derive(Debug, Clone, Default)]
pub struct FailOnly {
    kinds: HashSet<FetchKind>,
}

impl FailOnly {
    pub fn new(kinds: impl IntoIterator<Item = FetchKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }
}

impl FailurePolicy for FailOnly {
    fn should_fail(&self, kind: FetchKind) -> bool {
        self.kinds.contains(&kind)
    }
}

/// Adapts a closure into a policy
pub struct FailWhen<F>(pub F);

impl<F> FailurePolicy for FailWhen<F>
where
    F: Fn(FetchKind) -> bool + Send + Sync,
{
    fn should_fail(&self, kind: FetchKind) -> bool {
        (self.0)(kind)
    }
}

fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_policies() {
        for kind in FetchKind::ALL {
            assert!(!NeverFail.should_fail(kind));
            assert!(AlwaysFail.should_fail(kind));
        }
    }

    #[test]
    fn test_random_failure_bounds() {
        let never = RandomFailure::new(0.0);
        let always = RandomFailure::new(1.0);
        for _ in 0..100 {
            assert!(!never.should_fail(FetchKind::Cities));
            assert!(always.should_fail(FetchKind::Cities));
        }
        assert_eq!(RandomFailure::new(7.5).probability(), 1.0);
        assert_eq!(RandomFailure::new(f64::NAN).probability(), 0.0);
    }

    #[test]
    fn test_seeded_failure_is_reproducible() {
        let a = SeededFailure::new(0.3, 42);
        let b = SeededFailure::new(0.3, 42);
        let seq_a: Vec<bool> = (0..64).map(|_| a.should_fail(FetchKind::States)).collect();
        let seq_b: Vec<bool> = (0..64).map(|_| b.should_fail(FetchKind::States)).collect();
        assert_eq!(seq_a, seq_b);
        assert!(seq_a.iter().any(|f| *f));
        assert!(seq_a.iter().any(|f| !*f));
    }

    #[test]
    fn test_scripted_failure_replays_then_passes() {
        let policy = ScriptedFailure::new([true, false, true]);
        assert!(policy.should_fail(FetchKind::Continents));
        assert!(!policy.should_fail(FetchKind::Continents));
        assert_eq!(policy.remaining(), 1);
        assert!(policy.should_fail(FetchKind::Continents));
        assert!(!policy.should_fail(FetchKind::Continents));
    }

    #[test]
    fn test_fail_only_and_closure() {
        let policy = FailOnly::new([FetchKind::Cities]);
        assert!(policy.should_fail(FetchKind::Cities));
        assert!(!policy.should_fail(FetchKind::States));

        let policy = FailWhen(|kind: FetchKind| !kind.is_list());
        assert!(policy.should_fail(FetchKind::CityData));
        assert!(!policy.should_fail(FetchKind::Cities));
    }
}
