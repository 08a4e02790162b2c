//! TF-IDF scoring of candidate documents.
//!
//! For every query term the contribution of a field is
//! `(tf / df) * (1 / df) * boost / norm`, where `tf` is the raw count of the
//! term in the field, `df` the number of postings of the term among the
//! candidates and `norm` the field length norm. Field contributions are summed
//! per term and a document scores the best of its per-term sums.

use std::cmp::Ordering;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::search::stats::FieldTermCounts;

/// Score of one document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentScore {
    /// Document id.
    pub id: String,
    /// Relevance score.
    pub score: f64,
}

impl DocumentScore {
    /// Create a new document score.
    pub fn new<S: Into<String>>(id: S, score: f64) -> Self {
        DocumentScore {
            id: id.into(),
            score,
        }
    }
}

/// Score `docs` against `query_terms`, best first.
pub fn score(
    query_terms: &[String],
    term_dfs: &AHashMap<String, usize>,
    docs: &[(String, FieldTermCounts)],
    doc_field_norms: &AHashMap<String, Vec<f64>>,
    field_boosts: &[f64],
) -> Vec<DocumentScore> {
    let mut scores: Vec<DocumentScore> = docs
        .iter()
        .map(|(id, fields)| {
            let norms = doc_field_norms.get(id).map(Vec::as_slice).unwrap_or(&[]);
            let best = query_terms
                .iter()
                .map(|term| term_score(term, term_dfs, fields, norms, field_boosts))
                .fold(0.0, f64::max);
            DocumentScore::new(id.as_str(), best)
        })
        .collect();

    scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scores
}

fn term_score(
    term: &str,
    term_dfs: &AHashMap<String, usize>,
    fields: &FieldTermCounts,
    norms: &[f64],
    field_boosts: &[f64],
) -> f64 {
    let df = match term_dfs.get(term) {
        Some(&df) if df > 0 => df as f64,
        _ => return 0.0,
    };

    fields
        .iter()
        .enumerate()
        .map(|(field, counts)| {
            let tf = counts.get(term).copied().unwrap_or(0) as f64;
            let norm = norms.get(field).copied().unwrap_or(0.0);
            if tf == 0.0 || norm == 0.0 {
                return 0.0;
            }
            let boost = field_boosts.get(field).copied().unwrap_or(1.0);
            (tf / df) * (1.0 / df) * boost / norm
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, usize)]) -> AHashMap<String, usize> {
        pairs.iter().map(|(t, c)| (t.to_string(), *c)).collect()
    }

    fn norms(pairs: &[(&str, Vec<f64>)]) -> AHashMap<String, Vec<f64>> {
        pairs.iter().map(|(id, n)| (id.to_string(), n.clone())).collect()
    }

    #[test]
    fn test_single_field_formula() {
        let dfs = counts(&[("quick", 3)]);
        let docs = vec![
            ("1".to_string(), vec![counts(&[("quick", 1)])]),
            ("2".to_string(), vec![counts(&[("quick", 2)])]),
        ];
        let norms = norms(&[("1", vec![2.0_f64.sqrt()]), ("2", vec![3.0_f64.sqrt()])]);

        let scores = score(&["quick".to_string()], &dfs, &docs, &norms, &[1.0]);

        assert_eq!(scores[0].id, "2");
        assert!((scores[0].score - (2.0 / 3.0) * (1.0 / 3.0) / 3.0_f64.sqrt()).abs() < 1e-12);
        assert!((scores[1].score - (1.0 / 3.0) * (1.0 / 3.0) / 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_max_over_terms_and_boosts() {
        let dfs = counts(&[("a", 1), ("b", 2)]);
        let docs = vec![(
            "x".to_string(),
            vec![counts(&[("a", 1)]), counts(&[("a", 1), ("b", 2)])],
        )];
        let norms = norms(&[("x", vec![1.0, 2.0])]);
        let terms = vec!["a".to_string(), "b".to_string()];

        let scores = score(&terms, &dfs, &docs, &norms, &[1.0, 4.0]);

        // a: 1 + 4/2 = 3; b: (2/2)*(1/2)*4/2 = 1
        assert!((scores[0].score - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_or_missing_norm_contributes_nothing() {
        let dfs = counts(&[("a", 1)]);
        let docs = vec![
            ("zero".to_string(), vec![counts(&[("a", 1)])]),
            ("missing".to_string(), vec![counts(&[("a", 1)])]),
        ];
        let norms = norms(&[("zero", vec![0.0])]);

        let scores = score(&["a".to_string()], &dfs, &docs, &norms, &[1.0]);

        assert!(scores.iter().all(|s| s.score == 0.0 && s.score.is_finite()));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let dfs = counts(&[("a", 2), ("b", 1)]);
        let docs = vec![
            ("1".to_string(), vec![counts(&[("a", 1), ("b", 1)])]),
            ("2".to_string(), vec![counts(&[("a", 1)])]),
        ];
        let norms = norms(&[("1", vec![1.5]), ("2", vec![1.0])]);
        let terms = vec!["a".to_string(), "b".to_string()];

        assert_eq!(
            score(&terms, &dfs, &docs, &norms, &[1.0]),
            score(&terms, &dfs, &docs, &norms, &[1.0])
        );
    }
}
