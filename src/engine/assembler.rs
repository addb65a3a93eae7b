// src/engine/assembler.rs

//! CO-balanced paper assembly.
//!
//! Two passes over the per-CO pools:
//! 1. every CO gets `floor(total / co_count)` marks, taking 2-mark questions while
//!    they fit and topping up with 1-mark questions;
//! 2. the leftover `total % co_count` marks are drawn from whatever is still
//!    unselected across all COs, 2-mark first when at least 2 marks remain.
//!
//! The greedy order is a fixed tie-break, not an optimal packing. A pool that
//! cannot satisfy the quotas through this procedure is reported as
//! `InsufficientQuestionPool` even if some other tiling would have worked.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::Serialize;

use super::{EngineError, QuestionId, Quotas, Weightage};

/// Unselected questions of one course outcome, split by weightage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoPool {
    pub weight1: Vec<QuestionId>,
    pub weight2: Vec<QuestionId>,
}

impl CoPool {
    /// Groups questions into `co_count` pools. Index `i` of the result holds CO `i + 1`.
    ///
    /// Questions without a CO, or with a CO above `co_count`, are left out.
    pub fn partition<I>(co_count: u32, questions: I) -> Vec<CoPool>
    where
        I: IntoIterator<Item = (QuestionId, Option<u32>, Weightage)>,
    {
        let mut pools = vec![CoPool::default(); co_count as usize];
        for (id, co, weightage) in questions {
            let Some(pool) = co
                .filter(|co| (1..=co_count).contains(co))
                .and_then(|co| pools.get_mut(co as usize - 1))
            else {
                continue;
            };
            match weightage {
                Weightage::One => pool.weight1.push(id),
                Weightage::Two => pool.weight2.push(id),
            }
        }
        pools
    }
}

/// Question ids placed on one student's paper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaperSelection {
    /// Weight-1 questions.
    pub phase1: Vec<QuestionId>,
    /// Weight-2 questions.
    pub phase2: Vec<QuestionId>,
}

impl PaperSelection {
    pub fn contains(&self, id: QuestionId) -> bool {
        self.phase1.contains(&id) || self.phase2.contains(&id)
    }
}

/// Assembles a paper meeting `quotas` exactly, or fails without a partial result.
pub fn assemble_paper<R>(
    quotas: &Quotas,
    pools: &[CoPool],
    rng: &mut R,
) -> Result<PaperSelection, EngineError>
where
    R: Rng + ?Sized,
{
    if pools.is_empty() {
        return Err(EngineError::NoCourseOutcomes);
    }

    let co_count = pools.len();
    let total_marks = quotas.total_marks();
    let marks_per_co = total_marks / co_count;
    let mut remainder = total_marks - marks_per_co * co_count;

    tracing::debug!(
        total_marks,
        marks_per_co,
        remainder,
        co_count,
        "assembling paper"
    );

    let mut remaining: Vec<CoPool> = pools.to_vec();
    let mut selection = PaperSelection::default();

    for pool in remaining.iter_mut() {
        pool.weight1.shuffle(rng);
        pool.weight2.shuffle(rng);

        let mut marks = 0;
        let mut take2 = 0;
        while marks + 2 <= marks_per_co && take2 < pool.weight2.len() {
            take2 += 1;
            marks += 2;
        }
        let mut take1 = 0;
        while marks < marks_per_co && take1 < pool.weight1.len() {
            take1 += 1;
            marks += 1;
        }

        selection.phase2.extend(pool.weight2.drain(..take2));
        selection.phase1.extend(pool.weight1.drain(..take1));
    }

    tracing::trace!(
        phase1 = selection.phase1.len(),
        phase2 = selection.phase2.len(),
        "even distribution done"
    );

    while remainder > 0 {
        let mut spare2 = spare(&remaining, |p| &p.weight2);
        let mut spare1 = spare(&remaining, |p| &p.weight1);
        spare2.shuffle(rng);
        spare1.shuffle(rng);

        if remainder >= 2 && !spare2.is_empty() {
            let (co, id) = spare2[0];
            remaining[co].weight2.retain(|q| *q != id);
            selection.phase2.push(id);
            remainder -= 2;
        } else if !spare1.is_empty() {
            let (co, id) = spare1[0];
            remaining[co].weight1.retain(|q| *q != id);
            selection.phase1.push(id);
            remainder -= 1;
        } else {
            break;
        }
    }

    if selection.phase1.len() != quotas.weight1 || selection.phase2.len() != quotas.weight2 {
        tracing::debug!(
            required_weight1 = quotas.weight1,
            required_weight2 = quotas.weight2,
            obtained_weight1 = selection.phase1.len(),
            obtained_weight2 = selection.phase2.len(),
            "question pool cannot meet quotas"
        );
        return Err(EngineError::InsufficientQuestionPool {
            required_weight1: quotas.weight1,
            required_weight2: quotas.weight2,
            obtained_weight1: selection.phase1.len(),
            obtained_weight2: selection.phase2.len(),
        });
    }

    Ok(selection)
}

fn spare<F>(pools: &[CoPool], bucket: F) -> Vec<(usize, QuestionId)>
where
    F: Fn(&CoPool) -> &Vec<QuestionId>,
{
    pools
        .iter()
        .enumerate()
        .flat_map(|(co, pool)| bucket(pool).iter().map(move |id| (co, *id)))
        .collect()
}

/// Available stock of one course outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoCapacity {
    pub co_number: String,
    pub weight1_available: usize,
    pub weight2_available: usize,
}

/// Required vs. available question counts for a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolCapacity {
    pub weight1_required: usize,
    pub weight1_available: usize,
    pub weight2_required: usize,
    pub weight2_available: usize,
    pub outcomes: Vec<CoCapacity>,
    /// Whether assembly can succeed with the current bank.
    pub ready: bool,
}

/// Reports whether the bank is stocked well enough for `quotas`.
///
/// `ready` is decided by running the selection procedure itself on the counts, so
/// it agrees with `assemble_paper`: the outcome depends only on how many
/// questions each pool holds, never on which ones the shuffle picks.
pub fn check_pool_capacity(quotas: &Quotas, pools: &[CoPool]) -> PoolCapacity {
    let outcomes: Vec<CoCapacity> = pools
        .iter()
        .enumerate()
        .map(|(i, pool)| CoCapacity {
            co_number: super::co_label(i as u32 + 1),
            weight1_available: pool.weight1.len(),
            weight2_available: pool.weight2.len(),
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(0);
    let ready = assemble_paper(quotas, pools, &mut rng).is_ok();

    PoolCapacity {
        weight1_required: quotas.weight1,
        weight1_available: outcomes.iter().map(|c| c.weight1_available).sum(),
        weight2_required: quotas.weight2,
        weight2_available: outcomes.iter().map(|c| c.weight2_available).sum(),
        outcomes,
        ready,
    }
}
