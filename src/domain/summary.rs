use std::collections::HashSet;

use super::types::ReviewResult;

/// Figures shown at the top of the results view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewSummary {
    pub total_issues: usize,
    pub files_affected: usize,
    pub linter_findings: usize,
    pub quality_score: Option<f64>,
}

impl ReviewSummary {
    pub fn from_review(review: &ReviewResult) -> Self {
        let files: HashSet<&str> = review.ai_log.iter().map(|i| i.file.as_str()).collect();
        let linter_findings = review
            .linter_results
            .values()
            .flatten()
            .filter(|issue| issue.is_finding())
            .count();

        Self {
            total_issues: review.ai_log.len(),
            files_affected: files.len(),
            linter_findings,
            quality_score: review.code_quality_score,
        }
    }
}
