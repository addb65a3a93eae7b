// src/engine/quota.rs

use serde::Serialize;

use super::EngineError;

/// Required number of weight-1 and weight-2 questions on a paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quotas {
    pub weight1: usize,
    pub weight2: usize,
}

impl Quotas {
    pub fn total_marks(&self) -> usize {
        self.weight1 + 2 * self.weight2
    }

    pub fn question_count(&self) -> usize {
        self.weight1 + self.weight2
    }
}

/// Derives the weight-1/weight-2 split for `question_count` questions worth
/// `exam_marks` in total.
///
/// Each weight-2 question adds exactly one mark over a weight-1 question, so
/// `weight2 = M - N` and `weight1 = 2N - M`. Feasible only for `N <= M <= 2N`.
pub fn compute_quotas(
    exam_marks: u32,
    question_count: u32,
    co_count: u32,
) -> Result<Quotas, EngineError> {
    if co_count == 0 {
        return Err(EngineError::NoCourseOutcomes);
    }

    let marks = u64::from(exam_marks);
    let count = u64::from(question_count);
    if marks < count || marks > 2 * count {
        return Err(EngineError::InvalidQuota {
            exam_marks,
            question_count,
        });
    }

    Ok(Quotas {
        weight1: (2 * count - marks) as usize,
        weight2: (marks - count) as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_marks_between_weights() {
        let q = compute_quotas(10, 6, 2).unwrap();
        assert_eq!(q, Quotas { weight1: 2, weight2: 4 });
        assert_eq!(q.question_count(), 6);
        assert_eq!(q.total_marks(), 10);
    }

    #[test]
    fn every_feasible_combination_adds_up() {
        for n in 0..40u32 {
            for m in n..=2 * n {
                let q = compute_quotas(m, n, 3).unwrap();
                assert_eq!(q.weight1, (2 * n - m) as usize);
                assert_eq!(q.weight2, (m - n) as usize);
                assert_eq!(q.question_count(), n as usize);
                assert_eq!(q.total_marks(), m as usize);
            }
        }
    }

    #[test]
    fn boundaries_are_all_one_or_all_two() {
        assert_eq!(compute_quotas(8, 8, 1).unwrap(), Quotas { weight1: 8, weight2: 0 });
        assert_eq!(compute_quotas(16, 8, 1).unwrap(), Quotas { weight1: 0, weight2: 8 });
        assert_eq!(compute_quotas(0, 0, 1).unwrap(), Quotas { weight1: 0, weight2: 0 });
    }

    #[test]
    fn rejects_too_few_marks() {
        assert_eq!(
            compute_quotas(5, 10, 2),
            Err(EngineError::InvalidQuota {
                exam_marks: 5,
                question_count: 10
            })
        );
    }

    #[test]
    fn rejects_too_many_marks() {
        assert!(matches!(
            compute_quotas(21, 10, 2),
            Err(EngineError::InvalidQuota { .. })
        ));
    }

    #[test]
    fn rejects_course_without_outcomes() {
        assert_eq!(compute_quotas(10, 6, 0), Err(EngineError::NoCourseOutcomes));
        // Outcomes are checked before feasibility.
        assert_eq!(compute_quotas(5, 10, 0), Err(EngineError::NoCourseOutcomes));
    }

    #[test]
    fn identical_inputs_yield_identical_quotas() {
        assert_eq!(compute_quotas(37, 25, 4), compute_quotas(37, 25, 4));
    }

    #[test]
    fn handles_large_counts_without_overflow() {
        let q = compute_quotas(u32::MAX, u32::MAX, 1).unwrap();
        assert_eq!(q.weight2, 0);
        assert_eq!(q.weight1, u32::MAX as usize);
    }
}
