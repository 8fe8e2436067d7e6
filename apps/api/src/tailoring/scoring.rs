//! Truth Scorer.
//!
//! Start at 100, subtract a fixed penalty per verdict, clamp once at the end.
//! No verdicts means no confidence: an empty list scores 0.

use crate::tailoring::models::{BulletVerification, VerificationStatus};

pub const MAX_SCORE: i64 = 100;
pub const STRETCH_PENALTY: i64 = 8;
pub const UNSUPPORTED_PENALTY: i64 = 20;

pub fn penalty(status: VerificationStatus) -> i64 {
    match status {
        VerificationStatus::Supported => 0,
        VerificationStatus::Stretch => STRETCH_PENALTY,
        VerificationStatus::Unsupported => UNSUPPORTED_PENALTY,
    }
}

pub fn truth_score(verifications: &[BulletVerification]) -> u32 {
    if verifications.is_empty() {
        return 0;
    }
    let raw: i64 = MAX_SCORE - verifications.iter().map(|v| penalty(v.status)).sum::<i64>();
    raw.clamp(0, MAX_SCORE) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(status: VerificationStatus) -> BulletVerification {
        BulletVerification {
            bullet_id: None,
            bullet_text: "claim".to_string(),
            section: None,
            status,
            reason: String::new(),
            evidence: "none".to_string(),
            suggested_fix: None,
        }
    }

    fn verdicts(statuses: &[VerificationStatus]) -> Vec<BulletVerification> {
        statuses.iter().copied().map(verdict).collect()
    }

    use VerificationStatus::{Stretch, Supported, Unsupported};

    #[test]
    fn test_empty_list_scores_zero() {
        assert_eq!(truth_score(&[]), 0);
    }

    #[test]
    fn test_single_verdicts() {
        assert_eq!(truth_score(&verdicts(&[Supported])), 100);
        assert_eq!(truth_score(&verdicts(&[Unsupported])), 80);
        assert_eq!(truth_score(&verdicts(&[Stretch])), 92);
    }

    #[test]
    fn test_mixed_penalties() {
        assert_eq!(truth_score(&verdicts(&[Stretch, Stretch, Unsupported])), 64);
    }

    #[test]
    fn test_clamps_at_zero() {
        assert_eq!(truth_score(&verdicts(&[Unsupported; 15])), 0);
    }

    #[test]
    fn test_order_independent() {
        let a = verdicts(&[Supported, Stretch, Unsupported, Stretch]);
        let mut b = a.clone();
        b.reverse();
        let mut c = a.clone();
        c.rotate_left(1);
        assert_eq!(truth_score(&a), truth_score(&b));
        assert_eq!(truth_score(&a), truth_score(&c));
    }

    #[test]
    fn test_always_within_bounds() {
        let all = [Supported, Stretch, Unsupported];
        for n in 0..40 {
            let list: Vec<_> = (0..n).map(|i| verdict(all[(i * 7 + n) % 3])).collect();
            let score = truth_score(&list);
            assert!(score <= 100, "score {score} for {n} verdicts");
        }
    }
}
