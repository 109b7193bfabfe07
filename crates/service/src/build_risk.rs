//! Heuristic build-failure risk from a change set (file name to changed lines).

use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;
use tracing::info;

/// Component risk above which the overall score is bumped.
const BUMP_THRESHOLD: f64 = 0.7;
/// Component risk above which a file is reported.
const REPORT_THRESHOLD: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredictedOutcome {
    LikelyFail,
    LikelySuccess,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRiskAssessment {
    pub overall_risk_score: f64,
    pub predicted_outcome: PredictedOutcome,
    pub component_risks: BTreeMap<String, String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BuildRiskAssessor;

impl BuildRiskAssessor {
    /// Score `changes`, drawing per-file jitter from `rng`.
    pub fn assess<R: Rng + ?Sized>(
        &self,
        changes: &BTreeMap<String, u32>,
        rng: &mut R,
    ) -> BuildRiskAssessment {
        let mut overall = (0.1 + 0.05 * changes.len() as f64).min(0.5);
        let mut component_risks = BTreeMap::new();

        for (file, size) in changes {
            let risk = component_risk(file, *size, rng.gen::<f64>() * 0.1);
            if risk > BUMP_THRESHOLD {
                overall += 0.1;
            }
            if risk > REPORT_THRESHOLD {
                let note = format!("High risk ({risk:.2}): Consider additional testing");
                component_risks.insert(file.clone(), note);
            }
        }

        let overall = overall.min(1.0);
        let predicted_outcome = if overall > BUMP_THRESHOLD {
            PredictedOutcome::LikelyFail
        } else {
            PredictedOutcome::LikelySuccess
        };
        info!(files = changes.len(), overall, outcome = ?predicted_outcome, "build risk assessed");
        BuildRiskAssessment {
            overall_risk_score: overall,
            predicted_outcome,
            component_risks,
        }
    }

    pub fn assess_random(&self, changes: &BTreeMap<String, u32>) -> BuildRiskAssessment {
        self.assess(changes, &mut rand::thread_rng())
    }
}

/// Keyword matching is case-sensitive: `AuthRepository.java` earns no bonus.
fn component_risk(name: &str, size: u32, jitter: f64) -> f64 {
    let mut risk = (size as f64 * 0.01).min(0.3);
    if name.contains("security") || name.contains("auth") {
        risk += 0.2;
    }
    if name.contains("repository") || name.contains("dao") {
        risk += 0.15;
    }
    (risk + jitter).min(1.0)
}
