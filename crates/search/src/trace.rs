use crate::{Individual, SearchError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One finished run of a strategy: the deck it settled on and how it got
/// there. `iterations` is only meaningful for the trajectory searches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub strategy: String,
    pub seed: u64,
    pub turns: u32,
    #[serde(default)]
    pub iterations: u64,
    pub wall_ms: u64,
    pub score: f64,
    pub deck: Vec<i32>,
    #[serde(default)]
    pub tuned: Option<Individual>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub runs: Vec<RunOutcome>,
    pub best: Option<RunOutcome>,
    pub wall_ms: u64,
}

impl BatchReport {
    pub fn from_runs(runs: Vec<RunOutcome>, wall_ms: u64) -> Self {
        let best = runs
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .cloned();
        Self {
            runs,
            best,
            wall_ms,
        }
    }

    pub fn to_text_report(&self) -> String {
        let mut lines = vec![format!(
            "runs: {} wall_ms: {}",
            self.runs.len(),
            self.wall_ms
        )];
        for (index, run) in self.runs.iter().enumerate() {
            lines.push(format!(
                "  run {:>3} | {} seed={} score={:.1} turns={} iterations={} wall_ms={}",
                index + 1,
                run.strategy,
                run.seed,
                run.score,
                run.turns,
                run.iterations,
                run.wall_ms
            ));
            lines.push(format!("    deck: {}", format_deck(&run.deck)));
            if let Some(tuned) = run.tuned.as_ref() {
                lines.push(format!(
                    "    tuned: start_temp={:.2} end_temp={:.2e} swap_rate={:.3}",
                    tuned.start_temp, tuned.end_temp, tuned.swap_rate
                ));
            }
        }
        if let Some(best) = self.best.as_ref() {
            lines.push(format!("best: {} score={:.1}", best.strategy, best.score));
            lines.push(format!("  deck: {}", format_deck(&best.deck)));
        } else {
            lines.push("best: (no runs)".to_string());
        }
        lines.join("\n")
    }
}

pub fn format_deck(deck: &[i32]) -> String {
    deck.iter()
        .map(|card| card.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn write_json(path: &Path, report: &BatchReport) -> Result<(), SearchError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(report)?;
    fs::write(path, body)?;
    Ok(())
}

pub fn write_text(path: &Path, report: &BatchReport) -> Result<(), SearchError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, report.to_text_report())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(score: f64) -> RunOutcome {
        RunOutcome {
            strategy: "beam".to_string(),
            seed: 1,
            turns: 4,
            iterations: 0,
            wall_ms: 10,
            score,
            deck: vec![1, 2, 3, 4],
            tuned: None,
        }
    }

    #[test]
    fn best_run_has_the_top_score() {
        let report = BatchReport::from_runs(vec![run(10.0), run(14.5), run(12.0)], 30);
        assert_eq!(report.best.as_ref().unwrap().score, 14.5);
    }

    #[test]
    fn empty_batch_has_no_best() {
        let report = BatchReport::from_runs(Vec::new(), 0);
        assert!(report.best.is_none());
        assert!(report.to_text_report().contains("no runs"));
    }

    #[test]
    fn round_trips_through_json() {
        let report = BatchReport::from_runs(vec![run(11.0)], 5);
        let body = serde_json::to_string(&report).unwrap();
        let parsed: BatchReport = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.runs.len(), 1);
        assert_eq!(parsed.best.unwrap().score, 11.0);
    }
}
