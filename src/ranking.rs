//! Ordering policies for the report.

use crate::ingest::Mode;
use crate::subject::Subject;
use clap::ValueEnum;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortPolicy {
    /// Average descending, ties broken by name ascending
    Average,
    /// Name ascending
    Name,
}

impl SortPolicy {
    /// Ranking for categorized reports, plain listing for flat ones.
    pub fn default_for(mode: Mode) -> Self {
        match mode {
            Mode::Categorized => SortPolicy::Average,
            Mode::Flat => SortPolicy::Name,
        }
    }

    pub fn compare(self, a: &Subject, b: &Subject) -> Ordering {
        match self {
            SortPolicy::Average => b
                .average()
                .total_cmp(&a.average())
                .then_with(|| a.name().cmp(b.name())),
            SortPolicy::Name => a.name().cmp(b.name()),
        }
    }
}

/// Returns `subjects` in report order.
pub fn sort_subjects(mut subjects: Vec<Subject>, policy: SortPolicy) -> Vec<Subject> {
    subjects.sort_by(|a, b| policy.compare(a, b));
    subjects
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(name: &str, scores: &[(&str, i64)]) -> Subject {
        let mut s = Subject::new(name);
        for &(category, score) in scores {
            s.add_score(Some(category), score);
        }
        s
    }

    fn names(subjects: &[Subject]) -> Vec<&str> {
        subjects.iter().map(Subject::name).collect()
    }

    #[test]
    fn test_equal_averages_break_ties_by_name() {
        let subjects = vec![
            subject("Bob", &[("math", 2), ("math", 4), ("physics", 5)]),
            subject("Alice", &[("english", 4)]),
            subject("Carl", &[("math", 2), ("english", 3)]),
        ];
        let sorted = sort_subjects(subjects, SortPolicy::Average);
        assert_eq!(names(&sorted), vec!["Alice", "Bob", "Carl"]);
        assert_eq!(sorted[2].average(), 2.5);
    }

    #[test]
    fn test_higher_average_first() {
        let subjects = vec![
            subject("Ann", &[("math", 2)]),
            subject("Zed", &[("math", 5)]),
        ];
        let sorted = sort_subjects(subjects, SortPolicy::Average);
        assert_eq!(names(&sorted), vec!["Zed", "Ann"]);
    }

    #[test]
    fn test_name_policy_ignores_average() {
        let subjects = vec![
            subject("Zed", &[("math", 5)]),
            subject("Ann", &[("math", 2)]),
        ];
        let sorted = sort_subjects(subjects, SortPolicy::Name);
        assert_eq!(names(&sorted), vec!["Ann", "Zed"]);
    }

    #[test]
    fn test_default_policy_per_mode() {
        assert_eq!(SortPolicy::default_for(Mode::Categorized), SortPolicy::Average);
        assert_eq!(SortPolicy::default_for(Mode::Flat), SortPolicy::Name);
    }
}
