//! Bullet identity matching: ties each verifier verdict back to an extracted bullet.
//!
//! The verifier may echo ids or text with small drift, so matchers are tried in
//! order and the first hit wins: model-supplied id → exact text → containment
//! either way → position in the reply. Every matcher is pure.

use crate::tailoring::models::ExtractedBullet;

/// What the verifier said about which bullet it was judging.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub bullet_id: Option<&'a str>,
    pub bullet_text: &'a str,
    /// Index of the verdict within the verifier's reply.
    pub position: usize,
}

pub trait BulletMatcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Index into `bullets` of the matched bullet, if any.
    fn find(&self, candidate: &Candidate<'_>, bullets: &[ExtractedBullet]) -> Option<usize>;
}

/// Trusts the model's id when it names an extracted bullet.
pub struct ById;

impl BulletMatcher for ById {
    fn name(&self) -> &'static str {
        "id"
    }

    fn find(&self, candidate: &Candidate<'_>, bullets: &[ExtractedBullet]) -> Option<usize> {
        let id = candidate.bullet_id?.trim();
        bullets.iter().position(|b| b.id == id)
    }
}

pub struct ExactText;

impl BulletMatcher for ExactText {
    fn name(&self) -> &'static str {
        "exact_text"
    }

    fn find(&self, candidate: &Candidate<'_>, bullets: &[ExtractedBullet]) -> Option<usize> {
        let text = candidate.bullet_text.trim();
        if text.is_empty() {
            return None;
        }
        bullets.iter().position(|b| b.text.trim() == text)
    }
}

pub struct Containment;

impl BulletMatcher for Containment {
    fn name(&self) -> &'static str {
        "containment"
    }

    fn find(&self, candidate: &Candidate<'_>, bullets: &[ExtractedBullet]) -> Option<usize> {
        let text = candidate.bullet_text.trim();
        if text.is_empty() {
            return None;
        }
        bullets.iter().position(|b| {
            let bullet = b.text.trim();
            !bullet.is_empty() && (bullet.contains(text) || text.contains(bullet))
        })
    }
}

pub struct ByPosition;

impl BulletMatcher for ByPosition {
    fn name(&self) -> &'static str {
        "position"
    }

    fn find(&self, candidate: &Candidate<'_>, bullets: &[ExtractedBullet]) -> Option<usize> {
        (candidate.position < bullets.len()).then_some(candidate.position)
    }
}

/// First-match-wins composition of matchers.
pub struct MatcherChain {
    matchers: Vec<Box<dyn BulletMatcher>>,
}

impl MatcherChain {
    pub fn new(matchers: Vec<Box<dyn BulletMatcher>>) -> Self {
        Self { matchers }
    }

    /// Returns the matched bullet index and the name of the matcher that hit.
    pub fn resolve(
        &self,
        candidate: &Candidate<'_>,
        bullets: &[ExtractedBullet],
    ) -> Option<(usize, &'static str)> {
        self.matchers
            .iter()
            .find_map(|m| m.find(candidate, bullets).map(|index| (index, m.name())))
    }
}

impl Default for MatcherChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(ById),
            Box::new(ExactText),
            Box::new(Containment),
            Box::new(ByPosition),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tailoring::models::Section;

    fn bullets() -> Vec<ExtractedBullet> {
        [
            ("summary_0", "Analyst focused on growth."),
            ("experience_0_0", "Increased quarterly revenue by 15%"),
            ("experience_0_1", "Built weekly dashboards in Looker"),
        ]
        .iter()
        .enumerate()
        .map(|(i, (id, text))| ExtractedBullet {
            id: id.to_string(),
            text: text.to_string(),
            section: if i == 0 { Section::Summary } else { Section::Experience },
            item_index: 0,
            bullet_index: i.saturating_sub(1),
            context: None,
        })
        .collect()
    }

    fn candidate<'a>(id: Option<&'a str>, text: &'a str, position: usize) -> Candidate<'a> {
        Candidate {
            bullet_id: id,
            bullet_text: text,
            position,
        }
    }

    #[test]
    fn test_model_id_wins_over_text() {
        let chain = MatcherChain::default();
        let c = candidate(Some("experience_0_1"), "Increased quarterly revenue by 15%", 0);
        assert_eq!(chain.resolve(&c, &bullets()), Some((2, "id")));
    }

    #[test]
    fn test_unknown_id_falls_through_to_exact_text() {
        let chain = MatcherChain::default();
        let c = candidate(Some("bullet-7"), "Increased quarterly revenue by 15%", 0);
        assert_eq!(chain.resolve(&c, &bullets()), Some((1, "exact_text")));
    }

    #[test]
    fn test_punctuation_drift_matches_by_containment() {
        let chain = MatcherChain::default();
        // Verifier dropped the trailing "in Looker".
        let c = candidate(None, "Built weekly dashboards", 0);
        assert_eq!(chain.resolve(&c, &bullets()), Some((2, "containment")));

        // Verifier added a trailing period.
        let c = candidate(None, "Increased quarterly revenue by 15%.", 0);
        assert_eq!(chain.resolve(&c, &bullets()), Some((1, "containment")));
    }

    #[test]
    fn test_positional_fallback() {
        let chain = MatcherChain::default();
        let c = candidate(None, "Something unrelated", 2);
        assert_eq!(chain.resolve(&c, &bullets()), Some((2, "position")));
    }

    #[test]
    fn test_out_of_range_position_is_unresolved() {
        let chain = MatcherChain::default();
        let c = candidate(None, "", 3);
        assert_eq!(chain.resolve(&c, &bullets()), None);
    }

    #[test]
    fn test_empty_text_never_matches_by_containment() {
        assert_eq!(Containment.find(&candidate(None, "  ", 0), &bullets()), None);
        assert_eq!(ExactText.find(&candidate(None, "", 0), &bullets()), None);
    }
}
