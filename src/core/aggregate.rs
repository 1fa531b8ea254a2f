use crate::core::catalog::{display_name, QuestionCatalog};
use crate::domain::model::{
    AnswerRecord, MinimumStandardAnalysis, PillarScore, QuestionId, ThematicScore,
};
use std::collections::BTreeMap;

/// One normalized score per catalog area, in catalog order.
///
/// Questions missing from `answers` are left out of both the numerator and
/// the denominator; an area with nothing answered (or only zero weights)
/// scores 0.
pub fn aggregate(answers: &BTreeMap<QuestionId, AnswerRecord>, catalog: &QuestionCatalog) -> Vec<ThematicScore> {
    catalog
        .areas()
        .iter()
        .map(|area| {
            let (actual, max) = area
                .question_ids
                .iter()
                .filter_map(|id| answers.get(id))
                .fold((0.0_f64, 0.0_f64), |(actual, max), record| {
                    (actual + record.score(), max + record.weight)
                });

            let score = if max > 0.0 {
                (actual / max).clamp(0.0, 1.0)
            } else {
                0.0
            };

            ThematicScore {
                pillar: area.pillar.clone(),
                thematic: area.thematic.clone(),
                score,
            }
        })
        .collect()
}

/// Mean thematic score per pillar, in order of first appearance.
pub fn pillar_scores(scores: &[ThematicScore]) -> Vec<PillarScore> {
    let mut order: Vec<&str> = Vec::new();
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();

    for score in scores {
        let entry = sums.entry(score.pillar.as_str()).or_insert_with(|| {
            order.push(score.pillar.as_str());
            (0.0, 0)
        });
        entry.0 += score.score;
        entry.1 += 1;
    }

    order
        .into_iter()
        .map(|pillar| {
            let (sum, count) = sums[pillar];
            let mean_score = sum / count as f64;
            PillarScore {
                pillar: pillar.to_string(),
                mean_score,
                percent: mean_score * 100.0,
            }
        })
        .collect()
}

pub fn minimum_standard_analysis(scores: &[ThematicScore]) -> MinimumStandardAnalysis {
    let below_minimum: Vec<String> = scores
        .iter()
        .filter(|s| s.below_minimum())
        .map(|s| display_name(&s.thematic))
        .collect();

    let message = match below_minimum.len() {
        0 => "Congratulations! All assessed areas meet or exceed the minimum standard.".to_string(),
        1 => format!(
            "The following area does not meet the minimum standard: {}",
            below_minimum[0]
        ),
        n => format!(
            "The following {} areas do not meet the minimum standard: {}",
            n,
            below_minimum.join(", ")
        ),
    };

    MinimumStandardAnalysis {
        below_minimum,
        message,
    }
}
