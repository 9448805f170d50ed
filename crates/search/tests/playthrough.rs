use deckopt_core::{DeckState, OpponentMatrix, RngState};
use deckopt_search::{
    beam_search, monte_carlo_tree_search, simulated_annealing, AnnealConfig, BeamConfig,
    MctsConfig,
};
use std::sync::Arc;

fn zeros(n: usize) -> Arc<OpponentMatrix> {
    Arc::new(OpponentMatrix::from_rows(vec![vec![0; n]; n]).unwrap())
}

fn is_permutation(cards: &[i32]) -> bool {
    let mut sorted = cards.to_vec();
    sorted.sort_unstable();
    sorted == (1..=cards.len() as i32).collect::<Vec<_>>()
}

// Against all-zero opponents every full permutation wins every position, so
// any complete playthrough must land exactly on the maximum score.

#[test]
fn beam_playthrough_reaches_the_maximum_on_zero_opponents() {
    let matrix = zeros(4);
    let config = BeamConfig { width: 4, depth: 4 };
    let mut rng = RngState::from_seed(1);
    let mut state = DeckState::new(matrix, 1);
    while !state.is_done() {
        let action = beam_search(&state, &config, &mut rng).unwrap();
        state.advance(action).unwrap();
    }
    assert_eq!(state.score(), 16.0);
    assert!(is_permutation(state.cards()));
}

#[test]
fn mcts_playthrough_reaches_the_maximum_on_zero_opponents() {
    let matrix = zeros(4);
    let config = MctsConfig {
        time_limit_ms: 60_000,
        max_simulations: 24,
        exploration_weight: 1.414,
    };
    let mut rng = RngState::from_seed(2);
    let mut state = DeckState::new(matrix, 2);
    while !state.is_done() {
        let action = monte_carlo_tree_search(&state, &config, &mut rng).unwrap();
        state.advance(action).unwrap();
    }
    assert_eq!(state.score(), 16.0);
    assert!(is_permutation(state.cards()));
}

#[test]
fn annealing_reaches_the_maximum_on_zero_opponents() {
    let matrix = zeros(4);
    let config = AnnealConfig {
        start_temp: 100.0,
        end_temp: 1e-3,
        swap_rate: 0.3,
        time_limit_ms: 30_000,
        max_iterations: 30,
    };
    let outcome = simulated_annealing(&matrix, &config, &mut RngState::from_seed(3));
    assert_eq!(outcome.best_score, 16.0);
    assert!(is_permutation(&outcome.best_deck));
}

#[test]
fn turn_based_searches_agree_with_the_cached_score() {
    // An asymmetric matrix, so scores actually move between turns.
    let matrix = Arc::new(
        OpponentMatrix::from_rows(vec![
            vec![5, 1, 2, 6],
            vec![3, 6, 4, 1],
            vec![6, 2, 5, 3],
            vec![1, 4, 3, 5],
        ])
        .unwrap(),
    );
    let config = BeamConfig { width: 2, depth: 4 };
    let mut rng = RngState::from_seed(7);
    let mut state = DeckState::new(matrix.clone(), 7);
    while !state.is_done() {
        let action = beam_search(&state, &config, &mut rng).unwrap();
        state.advance(action).unwrap();
        assert_eq!(state.score(), matrix.score_deck(state.cards()));
    }
}
