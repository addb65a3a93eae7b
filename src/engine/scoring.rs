// src/engine/scoring.rs

//! Per-CO and overall marks for a submitted exam.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize, Serializer};

use super::{AnswerOption, EngineError, PaperSelection, QuestionId, Weightage, co_label};

/// Course settings the scorer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringConfig {
    pub co_count: u32,
    pub exam_marks: u32,
}

/// What the scorer needs to know about one question in the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerKey {
    /// 1-based CO index, `None` when the question's CO label is unusable.
    pub co: Option<u32>,
    pub weightage: Weightage,
    pub correct_option: AnswerOption,
}

/// One recorded answer. `selected_option` is `None` when the student skipped it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub question_id: QuestionId,
    pub selected_option: Option<AnswerOption>,
}

/// A numeric result field or one of the sentinels that replace it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Graded<T> {
    Value(T),
    /// "A": nothing attempted for this CO.
    Absent,
    /// "M": malpractice detected, the submission is not scored.
    Malpractice,
}

impl<T> Graded<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Graded::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: Serialize> Serialize for Graded<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Graded::Value(v) => v.serialize(serializer),
            Graded::Absent => serializer.serialize_str("A"),
            Graded::Malpractice => serializer.serialize_str("M"),
        }
    }
}

/// A percentage kept in hundredths so it always renders with two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percentage(u64);

impl Percentage {
    /// `part / whole * 100`, rounded half-up to two decimals. Zero when `whole` is zero.
    pub fn of(part: u32, whole: u32) -> Self {
        if whole == 0 {
            return Percentage(0);
        }
        let (part, whole) = (u64::from(part), u64::from(whole));
        Percentage((part * 20_000 + whole) / (2 * whole))
    }

    pub fn hundredths(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeScore {
    pub co_number: String,
    pub marks: Graded<u32>,
    pub percentage: Graded<Percentage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamResult {
    pub outcomes: Vec<OutcomeScore>,
    pub overall_marks: Graded<u32>,
    pub overall_percentage: Graded<Percentage>,
}

/// Maximum attainable marks per CO across the whole question bank.
///
/// Index `i` holds CO `i + 1`. This is the CO percentage denominator and does not
/// depend on which questions landed on a particular paper.
pub fn co_max_marks(co_count: u32, answer_keys: &HashMap<QuestionId, AnswerKey>) -> Vec<u32> {
    let mut max = vec![0u32; co_count as usize];
    for key in answer_keys.values() {
        if let Some(slot) = key
            .co
            .filter(|co| (1..=co_count).contains(co))
            .and_then(|co| max.get_mut(co as usize - 1))
        {
            *slot += key.weightage.marks();
        }
    }
    max
}

/// Checks that every entry cites a question in the course's bank.
pub fn validate_submission(
    answer_keys: &HashMap<QuestionId, AnswerKey>,
    entries: &[AnswerEntry],
) -> Result<(), EngineError> {
    match entries.iter().find(|e| !answer_keys.contains_key(&e.question_id)) {
        Some(entry) => Err(EngineError::InvalidSubmissionReference {
            question_id: entry.question_id,
        }),
        None => Ok(()),
    }
}

/// Checks that every entry cites a question placed on the student's paper.
///
/// The paper's marks equal the exam marks, so a submission that passes this
/// check can never score above 100% overall.
pub fn validate_against_paper(
    paper: &PaperSelection,
    entries: &[AnswerEntry],
) -> Result<(), EngineError> {
    match entries.iter().find(|e| !paper.contains(e.question_id)) {
        Some(entry) => Err(EngineError::QuestionNotOnPaper {
            question_id: entry.question_id,
        }),
        None => Ok(()),
    }
}

/// Scores a submission.
///
/// With `malpractice` set every field is `M` and the entries are not inspected.
/// Otherwise a CO without any entry is `A`, and overall marks are the sum over all
/// correct entries, independent of the per-CO split.
pub fn score_submission(
    config: &ScoringConfig,
    co_max_marks: &[u32],
    answer_keys: &HashMap<QuestionId, AnswerKey>,
    entries: &[AnswerEntry],
    malpractice: bool,
) -> Result<ExamResult, EngineError> {
    if malpractice {
        return Ok(ExamResult {
            outcomes: (1..=config.co_count)
                .map(|co| OutcomeScore {
                    co_number: co_label(co),
                    marks: Graded::Malpractice,
                    percentage: Graded::Malpractice,
                })
                .collect(),
            overall_marks: Graded::Malpractice,
            overall_percentage: Graded::Malpractice,
        });
    }

    validate_submission(answer_keys, entries)?;

    // Every entry resolves after validation.
    let graded: Vec<(AnswerKey, bool)> = entries
        .iter()
        .filter_map(|e| {
            answer_keys
                .get(&e.question_id)
                .map(|key| (*key, e.selected_option == Some(key.correct_option)))
        })
        .collect();

    let outcomes = (1..=config.co_count)
        .map(|co| {
            let answered: Vec<&(AnswerKey, bool)> =
                graded.iter().filter(|(key, _)| key.co == Some(co)).collect();

            if answered.is_empty() {
                return OutcomeScore {
                    co_number: co_label(co),
                    marks: Graded::Absent,
                    percentage: Graded::Absent,
                };
            }

            let marks = earned(answered.into_iter().copied());
            let max = co_max_marks.get(co as usize - 1).copied().unwrap_or(0);
            OutcomeScore {
                co_number: co_label(co),
                marks: Graded::Value(marks),
                percentage: Graded::Value(Percentage::of(marks, max)),
            }
        })
        .collect();

    let overall = earned(graded.iter().copied());

    Ok(ExamResult {
        outcomes,
        overall_marks: Graded::Value(overall),
        overall_percentage: Graded::Value(Percentage::of(overall, config.exam_marks)),
    })
}

fn earned(graded: impl Iterator<Item = (AnswerKey, bool)>) -> u32 {
    graded
        .filter(|(_, correct)| *correct)
        .map(|(key, _)| key.weightage.marks())
        .sum()
}
