//! Final ordering of match results.

use crate::fuzzy::MatchResult;
use crate::index::NormalizedIndexEntry;
use std::collections::HashSet;

/// Promotes a literal synonym hit to the front and caps the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranker {
    cap: usize,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(25)
    }
}

impl Ranker {
    pub fn new(cap: usize) -> Self {
        Self { cap }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Order `matches` for display and return their index positions.
    ///
    /// The first match (in relevance order) whose synonym questions contain
    /// `query` literally goes first; the rest follow in relevance order. The
    /// output holds at most `cap` positions and never repeats one.
    pub fn rank(
        &self,
        matches: &[MatchResult],
        query: &str,
        entries: &[NormalizedIndexEntry],
    ) -> Vec<usize> {
        let exact = exact_match(matches, query, entries);

        let mut seen = HashSet::new();
        exact
            .into_iter()
            .chain(matches.iter().map(|m| m.position))
            .filter(|position| seen.insert(*position))
            .take(self.cap)
            .collect()
    }
}

fn exact_match(
    matches: &[MatchResult],
    query: &str,
    entries: &[NormalizedIndexEntry],
) -> Option<usize> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    matches
        .iter()
        .map(|m| m.position)
        .find(|&position| {
            entries.get(position).is_some_and(|entry| {
                entry
                    .synonym_questions
                    .iter()
                    .any(|synonym| synonym.contains(query.as_str()))
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(synonyms: &[&str]) -> NormalizedIndexEntry {
        NormalizedIndexEntry {
            question_text: String::new(),
            synonym_questions: synonyms.iter().map(|s| s.to_string()).collect(),
            synonym_concepts: Vec::new(),
        }
    }

    fn hit(position: usize, score: f64) -> MatchResult {
        MatchResult {
            position,
            score,
            fields: Vec::new(),
        }
    }

    #[test]
    fn test_exact_match_promoted() {
        let entries = [entry(&["kind hustet"]), entry(&["kind weint viel"]), entry(&["weinen"])];
        let matches = [hit(0, 0.1), hit(2, 0.2), hit(1, 0.3)];

        let ranked = Ranker::default().rank(&matches, "kind weint", &entries);
        assert_eq!(ranked, vec![1, 0, 2]);
    }

    #[test]
    fn test_no_exact_keeps_relevance_order() {
        let entries = [entry(&["a"]), entry(&["b"]), entry(&["c"])];
        let matches = [hit(2, 0.1), hit(0, 0.2), hit(1, 0.3)];

        let ranked = Ranker::default().rank(&matches, "zzz", &entries);
        assert_eq!(ranked, vec![2, 0, 1]);
    }

    #[test]
    fn test_first_exact_in_relevance_order_wins() {
        let entries = [entry(&["fieber messen"]), entry(&["fieber senken"])];
        let matches = [hit(1, 0.1), hit(0, 0.2)];

        let ranked = Ranker::default().rank(&matches, "fieber", &entries);
        assert_eq!(ranked, vec![1, 0]);
    }

    #[test]
    fn test_cap_with_and_without_exact() {
        let entries: Vec<_> = (0..40).map(|_| entry(&["x"])).collect();
        let matches: Vec<_> = (0..40).map(|i| hit(i, i as f64)).collect();

        let ranked = Ranker::default().rank(&matches, "nothing", &entries);
        assert_eq!(ranked.len(), 25);
        assert_eq!(ranked[24], 24);

        let mut entries = entries;
        entries[30] = entry(&["schnuller abgewöhnen"]);
        let ranked = Ranker::default().rank(&matches, "schnuller", &entries);
        assert_eq!(ranked.len(), 25);
        assert_eq!(ranked[0], 30);
        assert_eq!(&ranked[1..], &(0..24).collect::<Vec<_>>()[..]);
    }

    #[test]
    fn test_no_duplicates() {
        let entries = [entry(&["kind weint"])];
        let matches = [hit(0, 0.0), hit(0, 0.0)];
        assert_eq!(Ranker::default().rank(&matches, "kind weint", &entries), vec![0]);
    }

    #[test]
    fn test_empty_query_has_no_exact_match() {
        let entries = [entry(&["a"]), entry(&["b"])];
        let matches = [hit(1, 0.1), hit(0, 0.2)];
        assert_eq!(Ranker::default().rank(&matches, "", &entries), vec![1, 0]);
    }
}
