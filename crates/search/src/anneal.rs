use crate::AnnealConfig;
use deckopt_core::{OpponentMatrix, RngState};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnealOutcome {
    pub best_deck: Vec<i32>,
    pub best_score: f64,
    pub iterations: u64,
}

fn temperature(config: &AnnealConfig, t: f64) -> f64 {
    config.start_temp * (config.end_temp / config.start_temp).powf(t)
}

/// Single-trajectory annealing over the full permutation space. The whole
/// deck is directly mutable here, unlike the turn-based searches. The best
/// deck seen is tracked independently of what the walk accepts.
pub fn simulated_annealing(
    matrix: &OpponentMatrix,
    config: &AnnealConfig,
    rng: &mut RngState,
) -> AnnealOutcome {
    let n = matrix.size();
    let started = Instant::now();
    let time_limit = config.time_limit_ms as f64 / 1000.0;

    let mut current: Vec<i32> = (1..=n as i32).collect();
    rng.shuffle(&mut current);
    let mut current_score = matrix.score_deck(&current);
    let mut best = current.clone();
    let mut best_score = current_score;

    let max_swaps = ((config.swap_rate * n as f64) as u64).max(1);
    let mut iterations = 0u64;

    while iterations < config.max_iterations {
        let elapsed = started.elapsed().as_secs_f64();
        if elapsed > time_limit {
            break;
        }
        let t = if time_limit > 0.0 {
            elapsed / time_limit
        } else {
            1.0
        };
        let temperature = temperature(config, t);

        let mut candidate = current.clone();
        let num_swaps = rng.gen_u64(1, max_swaps);
        for _ in 0..num_swaps {
            let a = rng.gen_index(n);
            let b = rng.gen_index(n);
            candidate.swap(a, b);
        }

        let candidate_score = matrix.score_deck(&candidate);
        let diff = candidate_score - current_score;
        if diff >= 0.0 || (diff / temperature).exp() > rng.gen_unit() {
            current = candidate;
            current_score = candidate_score;
            if current_score > best_score {
                best_score = current_score;
                best = current.clone();
            }
        }
        iterations += 1;
    }

    AnnealOutcome {
        best_deck: best,
        best_score,
        iterations,
    }
}
