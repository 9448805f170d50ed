use crate::{
    beam_search, monte_carlo_tree_search, simulated_annealing, tune_annealing, AnnealConfig,
    BeamConfig, GeneticConfig, MctsConfig, RunOutcome, SearchError,
};
use deckopt_core::{DeckState, OpponentMatrix, RngState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// The configured strategies, dispatched as a plain enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Strategy {
    Beam(BeamConfig),
    Mcts(MctsConfig),
    Anneal(AnnealConfig),
    Genetic(GeneticConfig),
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Beam(_) => "beam",
            Self::Mcts(_) => "mcts",
            Self::Anneal(_) => "anneal",
            Self::Genetic(_) => "genetic",
        }
    }
}

pub(crate) fn uniform_legal_action(
    state: &DeckState,
    rng: &mut RngState,
) -> Result<usize, SearchError> {
    let actions = state.legal_actions();
    if actions.is_empty() {
        return Err(SearchError::EmptyLegalActions);
    }
    Ok(actions[rng.gen_index(actions.len())])
}

/// Run one strategy to a finished deck. The turn-based searches propose one
/// action per turn over a fresh seeded state; the trajectory searches hand
/// back their own best deck.
pub fn run_strategy(
    strategy: &Strategy,
    matrix: Arc<OpponentMatrix>,
    seed: u64,
) -> Result<RunOutcome, SearchError> {
    let started = Instant::now();
    let mut rng = RngState::from_seed(seed);

    let mut outcome = match strategy {
        Strategy::Beam(config) => {
            let mut state = DeckState::new(matrix, seed);
            let mut turns = 0u32;
            while !state.is_done() {
                let action = beam_search(&state, config, &mut rng)?;
                state.advance(action)?;
                turns += 1;
            }
            RunOutcome {
                strategy: strategy.label().to_string(),
                seed,
                turns,
                iterations: 0,
                wall_ms: 0,
                score: state.score(),
                deck: state.cards().to_vec(),
                tuned: None,
            }
        }
        Strategy::Mcts(config) => {
            let mut state = DeckState::new(matrix, seed);
            let mut turns = 0u32;
            while !state.is_done() {
                let action = monte_carlo_tree_search(&state, config, &mut rng)?;
                state.advance(action)?;
                turns += 1;
            }
            RunOutcome {
                strategy: strategy.label().to_string(),
                seed,
                turns,
                iterations: 0,
                wall_ms: 0,
                score: state.score(),
                deck: state.cards().to_vec(),
                tuned: None,
            }
        }
        Strategy::Anneal(config) => {
            let annealed = simulated_annealing(&matrix, config, &mut rng);
            RunOutcome {
                strategy: strategy.label().to_string(),
                seed,
                turns: 0,
                iterations: annealed.iterations,
                wall_ms: 0,
                score: annealed.best_score,
                deck: annealed.best_deck,
                tuned: None,
            }
        }
        Strategy::Genetic(config) => {
            let tuned = tune_annealing(&matrix, config, &mut rng);
            RunOutcome {
                strategy: strategy.label().to_string(),
                seed,
                turns: 0,
                iterations: 0,
                wall_ms: 0,
                score: tuned.best.fitness,
                deck: tuned.best_deck,
                tuned: Some(tuned.best),
            }
        }
    };
    outcome.wall_ms = started.elapsed().as_millis() as u64;
    Ok(outcome)
}
