//! Subjects and their accumulated scores.

use crate::utility::{mean, mean_of_scores};

/// Scores recorded under one category, in input order.
///
/// `category` is `None` for the single implicit category used in flat mode.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScores {
    pub category: Option<String>,
    pub scores: Vec<i64>,
}

impl CategoryScores {
    pub fn average(&self) -> Option<f64> {
        mean_of_scores(&self.scores)
    }
}

/// A named entity with scores grouped by category.
///
/// Categories keep the order in which they were first seen, so rendering is
/// stable across runs. Scores are only ever appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    name: String,
    categories: Vec<CategoryScores>,
}

impl Subject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn categories(&self) -> &[CategoryScores] {
        &self.categories
    }

    /// Appends `score` to `category`, creating the category on first use.
    pub fn add_score(&mut self, category: Option<&str>, score: i64) {
        match self
            .categories
            .iter_mut()
            .find(|c| c.category.as_deref() == category)
        {
            Some(entry) => entry.scores.push(score),
            None => self.categories.push(CategoryScores {
                category: category.map(str::to_string),
                scores: vec![score],
            }),
        }
    }

    /// Scores recorded under `category`, if any.
    pub fn scores(&self, category: Option<&str>) -> Option<&[i64]> {
        self.categories
            .iter()
            .find(|c| c.category.as_deref() == category)
            .map(|c| c.scores.as_slice())
    }

    /// Mean of the scores in `category`; `None` if the category is absent or empty.
    pub fn category_average(&self, category: Option<&str>) -> Option<f64> {
        self.scores(category).and_then(mean_of_scores)
    }

    /// Unweighted mean of the per-category means.
    ///
    /// Empty categories are skipped. A subject with no scores at all averages 0.0.
    pub fn average(&self) -> f64 {
        let per_category: Vec<f64> = self
            .categories
            .iter()
            .filter_map(CategoryScores::average)
            .collect();
        mean(&per_category)
    }

    pub fn score_count(&self) -> usize {
        self.categories.iter().map(|c| c.scores.len()).sum()
    }
}
