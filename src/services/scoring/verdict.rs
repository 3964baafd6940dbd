//! Automatic verdict from the computed result and a target profile.

use crate::models::profile::{TargetProfile, VerdictMethod};
use crate::models::result::{FinalResult, Verdict};

fn count_failures(result: &FinalResult, profile: &TargetProfile) -> u32 {
    let mut failures = 0;
    if result.responsibility < profile.min_responsibility {
        failures += 1;
    }
    if result.commitment_total < profile.min_commitment {
        failures += 1;
    }
    if result.obedience < profile.min_obedience {
        failures += 1;
    }
    if result.memory_pct < profile.min_memory_pct {
        failures += 1;
    }
    if result.matrices_pct < profile.min_matrices_pct {
        failures += 1;
    }
    if result.neuroticism > profile.max_neuroticism {
        failures += 1;
    }
    failures
}

/// Applies the profile's verdict method to the six threshold checks.
///
/// An unreliable evaluation short-circuits to REVISION regardless of the
/// failure count. Pending projective reviews block APTO under both methods.
pub fn decide(result: &FinalResult, profile: &TargetProfile, pending_projectives: bool) -> Verdict {
    if !result.reliable {
        return Verdict::Revision;
    }

    let failures = count_failures(result, profile);

    match profile.verdict_method {
        VerdictMethod::Strict => {
            if failures > 0 {
                Verdict::NoApto
            } else if pending_projectives {
                Verdict::Revision
            } else {
                Verdict::Apto
            }
        }
        VerdictMethod::FailureCount => {
            if failures == 0 && !pending_projectives {
                Verdict::Apto
            } else if failures >= 2 {
                Verdict::NoApto
            } else {
                Verdict::Revision
            }
        }
    }
}
