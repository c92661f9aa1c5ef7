//! Per-input explainer ranking.
//!
//! Standard competition ranking over descending combined score. Scores within
//! `epsilon` of a tie group's leader share its rank and are ordered by
//! ascending `ExplainerId`; the next group's rank skips the tied count.
//! Unscored entries all share rank `scored + 1`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use xaiboard_common::model::Score;
use xaiboard_common::{ExplainerId, InputId};

use crate::error::RankerError;

pub const DEFAULT_TIE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub explainer: ExplainerId,
    pub score: Score,
    pub rank: u32,
}

/// Rank the explainers of one input. Output is in display order.
pub fn rank(
    input: InputId,
    pairs: &[(ExplainerId, Score)],
    epsilon: f64,
) -> Result<Vec<RankedEntry>, RankerError> {
    let mut seen = BTreeSet::new();
    for (explainer, _) in pairs {
        if !seen.insert(*explainer) {
            return Err(RankerError::DuplicateExplainer { input, explainer: *explainer });
        }
    }

    let mut scored: Vec<(ExplainerId, f64)> = pairs
        .iter()
        .filter_map(|(id, s)| s.value().map(|v| (*id, v)))
        .collect();
    let mut unscored: Vec<ExplainerId> = pairs
        .iter()
        .filter(|(_, s)| !s.is_scored())
        .map(|(id, _)| *id)
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut out = Vec::with_capacity(pairs.len());
    let mut i = 0;
    while i < scored.len() {
        let leader = scored[i].1;
        let mut j = i + 1;
        while j < scored.len() && (leader - scored[j].1).abs() <= epsilon {
            j += 1;
        }
        let group = &mut scored[i..j];
        group.sort_by_key(|(id, _)| *id);
        let rank = (i + 1) as u32;
        out.extend(group.iter().map(|&(explainer, v)| RankedEntry {
            explainer,
            score: Score::Scored(v),
            rank,
        }));
        i = j;
    }

    let unscored_rank = scored.len() as u32 + 1;
    unscored.sort();
    out.extend(unscored.into_iter().map(|explainer| RankedEntry {
        explainer,
        score: Score::Unscored,
        rank: unscored_rank,
    }));

    Ok(out)
}
