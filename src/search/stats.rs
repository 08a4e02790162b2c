//! Term statistics gathered from candidate postings.

use ahash::{AHashMap, AHashSet};
use log::debug;

use crate::index::{field_index, term_of};
use crate::store::ViewRow;

/// Raw term counts of one document, indexed by field.
pub type FieldTermCounts = Vec<AHashMap<String, usize>>;

/// Per-query statistics over the postings of the candidate documents.
#[derive(Clone, Debug, Default)]
pub struct TermStatistics {
    /// Number of postings seen per term.
    pub term_dfs: AHashMap<String, usize>,
    /// Candidate documents in first-seen order with their per-field counts.
    pub docs: Vec<(String, FieldTermCounts)>,
    positions: AHashMap<String, usize>,
}

impl TermStatistics {
    /// Collect statistics from posting rows. Rows that are not postings are ignored.
    pub fn from_postings<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a ViewRow>,
    {
        let mut stats = TermStatistics::default();
        for row in rows {
            if let Some(term) = term_of(&row.key) {
                stats.add(&row.id, field_index(&row.value), term);
            }
        }
        stats
    }

    fn add(&mut self, id: &str, field: usize, term: &str) {
        *self.term_dfs.entry(term.to_string()).or_insert(0) += 1;

        let position = match self.positions.get(id) {
            Some(&position) => position,
            None => {
                self.positions.insert(id.to_string(), self.docs.len());
                self.docs.push((id.to_string(), Vec::new()));
                self.docs.len() - 1
            }
        };
        let fields = &mut self.docs[position].1;
        if fields.len() <= field {
            fields.resize_with(field + 1, AHashMap::new);
        }
        *fields[field].entry(term.to_string()).or_insert(0) += 1;
    }

    /// Number of candidate documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Check whether no document is a candidate.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Ids of the candidate documents in first-seen order.
    pub fn doc_ids(&self) -> impl Iterator<Item = &str> {
        self.docs.iter().map(|(id, _)| id.as_str())
    }

    /// Raw count of `term` in `field` of document `id`.
    pub fn term_count(&self, id: &str, field: usize, term: &str) -> usize {
        self.positions
            .get(id)
            .and_then(|&p| self.docs[p].1.get(field))
            .and_then(|counts| counts.get(term))
            .copied()
            .unwrap_or(0)
    }

    /// Drop documents matching too small a fraction of `query_terms`.
    ///
    /// A matched term that is not itself a query term came from the prefix
    /// scan on `prefix_term` and counts as that term. The matched fraction is
    /// truncated to two decimals before comparing with `mm`. Single-term
    /// queries are never filtered.
    pub fn apply_minimum_should_match(&mut self, query_terms: &[String], prefix_term: &str, mm: f64) {
        if query_terms.len() <= 1 {
            return;
        }
        let total = query_terms.len() as f64;
        let before = self.docs.len();

        self.docs.retain(|(_, fields)| {
            let matched: AHashSet<&str> = fields
                .iter()
                .flat_map(|counts| counts.keys())
                .map(|term| {
                    if query_terms.contains(term) {
                        term.as_str()
                    } else {
                        prefix_term
                    }
                })
                .collect();
            let fraction = (matched.len() as f64 / total * 100.0).floor() / 100.0;
            fraction >= mm
        });
        self.positions = self
            .docs
            .iter()
            .enumerate()
            .map(|(position, (id, _))| (id.clone(), position))
            .collect();

        debug!(
            "minimum should match {mm}: kept {} of {before} documents",
            self.docs.len()
        );
    }
}
