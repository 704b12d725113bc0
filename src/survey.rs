use std::collections::HashMap;

use crate::label::{Labeling, OTHER_LABEL};
use crate::pattern::{detect_cycle, to_base_digits, DEFAULT_MAX_ITER};

/// Default upper end of the surveyed range.
pub const DEFAULT_LIMIT: u64 = 255;

/// Row colors, cycled when patterns outnumber entries.
pub const PALETTE: [[u8; 3]; 12] = [
    [0x1f, 0x77, 0xb4],
    [0xff, 0x7f, 0x0e],
    [0x2c, 0xa0, 0x2c],
    [0xd6, 0x27, 0x28],
    [0x94, 0x67, 0xbd],
    [0x8c, 0x56, 0x4b],
    [0xe3, 0x77, 0xc2],
    [0xbc, 0xbd, 0x22],
    [0x17, 0xbe, 0xcf],
    [0xae, 0xc7, 0xe8],
    [0xff, 0xbb, 0x78],
    [0x98, 0xdf, 0x8a],
];

/// Neutral gray for the unresolved row.
pub const OTHER_COLOR: [u8; 3] = [0x9e, 0x9e, 0x9e];

/// Parameters of one survey pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurveyParams {
    /// Numeric base for digit extraction. Must be at least 2.
    pub base: u64,
    /// Upper end of the surveyed range 1..=limit.
    pub limit: u64,
    /// Iteration bound per start value.
    pub max_iter: usize,
}

impl SurveyParams {
    pub fn new(base: u64, limit: u64) -> Self {
        Self {
            base,
            limit,
            max_iter: DEFAULT_MAX_ITER,
        }
    }
}

/// Classification of every start value in 1..=limit: which cycle each one
/// falls into, row ordering, colors, and counts for the legend and key.
#[derive(Debug)]
pub struct PatternSurvey {
    pub params: SurveyParams,
    /// Label per start value; index 0 corresponds to n = 1.
    pub assignments: Vec<String>,
    /// Distinct labels in row order: lexicographic, unresolved last.
    pub rows: Vec<String>,
    labeling: Labeling,
    counts: HashMap<String, usize>,
}

/// Survey the whole range in one synchronous pass.
///
/// Labels depend only on the discovery order of distinct cycles, which is
/// fixed by iterating n ascending, so a survey is deterministic for given
/// parameters.
pub fn run_survey(params: SurveyParams) -> PatternSurvey {
    let mut labeling = Labeling::new();
    let mut assignments = Vec::with_capacity(params.limit as usize);
    let mut counts: HashMap<String, usize> = HashMap::new();

    for n in 1..=params.limit {
        let label = match detect_cycle(n, params.base, params.max_iter) {
            Some(cycle) => labeling.assign(&cycle),
            None => OTHER_LABEL.to_string(),
        };
        *counts.entry(label.clone()).or_insert(0) += 1;
        assignments.push(label);
    }

    let mut rows: Vec<String> = counts.keys().cloned().collect();
    rows.sort_by(|a, b| match (a == OTHER_LABEL, b == OTHER_LABEL) {
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        _ => a.cmp(b),
    });

    log::info!(
        "Surveyed 1..={} in base {}: {} distinct patterns{}",
        params.limit,
        params.base,
        labeling.len(),
        if counts.contains_key(OTHER_LABEL) {
            " (plus unresolved starts)"
        } else {
            ""
        },
    );

    PatternSurvey {
        params,
        assignments,
        rows,
        labeling,
        counts,
    }
}

impl PatternSurvey {
    /// Row index of a label, following the ordering of [`Self::rows`].
    pub fn row_of(&self, label: &str) -> Option<usize> {
        self.rows.iter().position(|l| l == label)
    }

    /// How many start values fell into the given row.
    pub fn count_of(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Number of distinct detected cycles (the unresolved row not included).
    pub fn distinct_patterns(&self) -> usize {
        self.labeling.len()
    }

    /// Whether any start value exhausted the iteration bound.
    pub fn has_unresolved(&self) -> bool {
        self.counts.contains_key(OTHER_LABEL)
    }

    /// Canonical cycle behind a label.
    pub fn cycle_of(&self, label: &str) -> Option<&[u64]> {
        self.labeling.cycle_of(label)
    }

    /// All start values assigned to the given label, ascending.
    pub fn members_of(&self, label: &str) -> Vec<u64> {
        self.assignments
            .iter()
            .enumerate()
            .filter(|(_, l)| l.as_str() == label)
            .map(|(i, _)| i as u64 + 1)
            .collect()
    }

    /// Color of a label's row. The unresolved row is always gray; detected
    /// cycles pick from the palette by row index.
    pub fn color_of(&self, label: &str) -> [u8; 3] {
        if label == OTHER_LABEL {
            return OTHER_COLOR;
        }
        match self.row_of(label) {
            Some(row) => PALETTE[row % PALETTE.len()],
            None => OTHER_COLOR,
        }
    }

    /// Key lines mapping each detected cycle's label to its digit spelling,
    /// in row order.
    pub fn pattern_key(&self) -> Vec<String> {
        if self.labeling.is_empty() {
            return Vec::new();
        }
        self.rows
            .iter()
            .filter(|l| l.as_str() != OTHER_LABEL)
            .filter_map(|label| {
                self.cycle_of(label)
                    .map(|cycle| format!("{label}: {}", cycle_display(cycle, self.params.base)))
            })
            .collect()
    }

    /// Print the key to stdout, mirroring the on-screen key panel.
    pub fn print_key(&self) {
        println!("\nPattern Key:");
        for line in self.pattern_key() {
            println!("  {line}");
        }
    }
}

/// Render one cycle member as its base-`base` digits joined by `.`.
fn digits_display(value: u64, base: u64) -> String {
    to_base_digits(value, base)
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Cycle members joined by `, `, each spelled in digits: `[169, 256]` in
/// base 10 renders as `1.6.9, 2.5.6`.
pub fn cycle_display(cycle: &[u64], base: u64) -> String {
    cycle
        .iter()
        .map(|&v| digits_display(v, base))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_ten_small_range() {
        let survey = run_survey(SurveyParams::new(10, 4));
        // 1 → [1], 2 → [169,256], 3 → [81], 4 → [169,256]
        assert_eq!(survey.assignments, vec!["a", "b", "c", "b"]);
        assert_eq!(survey.rows, vec!["a", "b", "c"]);
        assert_eq!(survey.count_of("a"), 1);
        assert_eq!(survey.count_of("b"), 2);
        assert_eq!(survey.count_of("c"), 1);
        assert_eq!(survey.distinct_patterns(), 3);
        assert!(!survey.has_unresolved());
    }

    #[test]
    fn survey_is_deterministic() {
        let a = run_survey(SurveyParams::new(10, 100));
        let b = run_survey(SurveyParams::new(10, 100));
        assert_eq!(a.assignments, b.assignments);
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.pattern_key(), b.pattern_key());
    }

    #[test]
    fn base_two_is_a_single_pattern() {
        let survey = run_survey(SurveyParams::new(2, 8));
        assert_eq!(survey.rows, vec!["a"]);
        assert_eq!(survey.count_of("a"), 8);
        assert_eq!(survey.cycle_of("a"), Some([1].as_slice()));
    }

    #[test]
    fn exhausted_bound_goes_to_the_unresolved_row() {
        // One iteration can never observe a repeat.
        let survey = run_survey(SurveyParams {
            base: 10,
            limit: 5,
            max_iter: 1,
        });
        assert_eq!(survey.rows, vec![OTHER_LABEL]);
        assert!(survey.has_unresolved());
        assert_eq!(survey.distinct_patterns(), 0);
        assert!(survey.pattern_key().is_empty());
        assert_eq!(survey.color_of(OTHER_LABEL), OTHER_COLOR);
    }

    #[test]
    fn unresolved_row_sorts_last() {
        // Two iterations resolve the fixed point at n = 1 but nothing else.
        let survey = run_survey(SurveyParams {
            base: 10,
            limit: 5,
            max_iter: 2,
        });
        assert_eq!(survey.rows, vec!["a", OTHER_LABEL]);
        assert_eq!(survey.count_of("a"), 1);
        assert_eq!(survey.count_of(OTHER_LABEL), 4);
    }

    #[test]
    fn members_match_assignments() {
        let survey = run_survey(SurveyParams::new(10, 4));
        assert_eq!(survey.members_of("b"), vec![2, 4]);
        assert_eq!(survey.members_of("a"), vec![1]);
        assert_eq!(survey.members_of("missing"), Vec::<u64>::new());
    }

    #[test]
    fn key_spells_cycles_in_digits() {
        let survey = run_survey(SurveyParams::new(10, 4));
        let key = survey.pattern_key();
        assert_eq!(key[0], "a: 1");
        assert_eq!(key[1], "b: 1.6.9, 2.5.6");
        assert_eq!(key[2], "c: 8.1");
    }

    #[test]
    fn cycle_display_other_bases() {
        assert_eq!(cycle_display(&[255], 16), "15.15");
        assert_eq!(cycle_display(&[1], 2), "1");
    }

    #[test]
    fn colors_are_stable_per_row() {
        let survey = run_survey(SurveyParams::new(10, 100));
        for label in &survey.rows {
            let row = survey.row_of(label).unwrap();
            if label != OTHER_LABEL {
                assert_eq!(survey.color_of(label), PALETTE[row % PALETTE.len()]);
            }
        }
    }
}
