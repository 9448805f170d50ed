use crate::{strategy::uniform_legal_action, MctsConfig, SearchError};
use deckopt_core::{DeckState, RngState};
use std::time::Instant;

// Arena slot: children are owned through indices, the parent link is a bare
// index used only by the backpropagation walk.
#[derive(Debug, Clone)]
struct Node {
    state: DeckState,
    parent: Option<usize>,
    action: Option<usize>,
    visits: u32,
    value_sum: f64,
    children: Vec<usize>,
    untried: Vec<usize>,
}

impl Node {
    fn new(state: DeckState, parent: Option<usize>, action: Option<usize>, rng: &mut RngState) -> Self {
        // Expansion pops from the back of this shuffled list: random order,
        // without replacement.
        let mut untried = state.legal_actions();
        rng.shuffle(&mut untried);
        Self {
            state,
            parent,
            action,
            visits: 0,
            value_sum: 0.0,
            children: Vec::new(),
            untried,
        }
    }

    fn is_terminal(&self) -> bool {
        self.state.is_done()
    }

    fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }
}

fn uct_value(node: &Node, parent_visits: u32, exploration_weight: f64) -> f64 {
    if node.visits == 0 {
        return f64::INFINITY;
    }
    let exploitation = node.value_sum / node.visits as f64;
    if parent_visits == 0 {
        // No parent history to normalize against; a flat bonus stands in
        // for the log term.
        return exploitation + exploration_weight;
    }
    let exploration =
        exploration_weight * ((parent_visits as f64).ln() / node.visits as f64).sqrt();
    exploitation + exploration
}

/// UCT tree search over deck states. The loop is bounded by wall clock and
/// simulation count, whichever expires first; the decision is the root child
/// with the most visits.
pub fn monte_carlo_tree_search(
    state: &DeckState,
    config: &MctsConfig,
    rng: &mut RngState,
) -> Result<usize, SearchError> {
    let started = Instant::now();
    let mut nodes = vec![Node::new(state.clone(), None, None, rng)];
    let mut simulations = 0u32;

    while simulations < config.max_simulations
        && (started.elapsed().as_millis() as u64) < config.time_limit_ms
    {
        // Selection: descend while fully expanded, maximizing UCT.
        let mut idx = 0usize;
        while !nodes[idx].is_terminal()
            && nodes[idx].is_fully_expanded()
            && !nodes[idx].children.is_empty()
        {
            let parent_visits = nodes[idx].visits;
            let mut best = nodes[idx].children[0];
            let mut best_value = f64::NEG_INFINITY;
            for &child in &nodes[idx].children {
                let value = uct_value(&nodes[child], parent_visits, config.exploration_weight);
                if value > best_value {
                    best_value = value;
                    best = child;
                }
            }
            idx = best;
        }

        // Expansion: one untried action becomes a new leaf.
        if !nodes[idx].is_terminal() {
            if let Some(action) = nodes[idx].untried.pop() {
                let mut next = nodes[idx].state.clone();
                next.advance(action)?;
                let child = Node::new(next, Some(idx), Some(action), rng);
                let child_idx = nodes.len();
                nodes.push(child);
                nodes[idx].children.push(child_idx);
                idx = child_idx;
            }
        }

        // Rollout: uniform random playout to a terminal state.
        let mut playout = nodes[idx].state.clone();
        while !playout.is_done() {
            let actions = playout.legal_actions();
            if actions.is_empty() {
                return Err(SearchError::EmptyLegalActions);
            }
            playout.advance(actions[rng.gen_index(actions.len())])?;
        }
        let result = playout.score();

        // Backpropagation, root inclusive.
        let mut walk = Some(idx);
        while let Some(node_idx) = walk {
            nodes[node_idx].visits += 1;
            nodes[node_idx].value_sum += result;
            walk = nodes[node_idx].parent;
        }
        simulations += 1;
    }

    // Robust child: most visits, earliest child wins ties.
    let mut best_action = None;
    let mut best_visits = 0u32;
    for &child in &nodes[0].children {
        if best_action.is_none() || nodes[child].visits > best_visits {
            best_visits = nodes[child].visits;
            best_action = nodes[child].action;
        }
    }
    match best_action {
        Some(action) => Ok(action),
        // Budget expired before any expansion; still owe the caller a move.
        None => uniform_legal_action(state, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckopt_core::OpponentMatrix;
    use std::sync::Arc;

    fn fixture() -> Arc<OpponentMatrix> {
        Arc::new(
            OpponentMatrix::from_rows(vec![
                vec![2, 3, 1, 4],
                vec![4, 1, 3, 2],
                vec![1, 4, 2, 3],
                vec![3, 2, 4, 1],
            ])
            .unwrap(),
        )
    }

    #[test]
    fn zero_simulation_budget_still_returns_a_legal_action() {
        let state = DeckState::new(fixture(), 21);
        let config = MctsConfig {
            time_limit_ms: 1000,
            max_simulations: 0,
            exploration_weight: 1.414,
        };
        let mut rng = RngState::from_seed(21);
        let action = monte_carlo_tree_search(&state, &config, &mut rng).unwrap();
        assert!(state.legal_actions().contains(&action));
    }

    #[test]
    fn expired_time_budget_still_returns_a_legal_action() {
        let state = DeckState::new(fixture(), 33);
        let config = MctsConfig {
            time_limit_ms: 0,
            max_simulations: 1000,
            exploration_weight: 1.414,
        };
        let mut rng = RngState::from_seed(33);
        let action = monte_carlo_tree_search(&state, &config, &mut rng).unwrap();
        assert!(state.legal_actions().contains(&action));
    }

    #[test]
    fn same_seed_same_decision() {
        // Generous wall clock so the simulation budget is the binding limit.
        let config = MctsConfig {
            time_limit_ms: 60_000,
            max_simulations: 64,
            exploration_weight: 1.414,
        };
        let state = DeckState::new(fixture(), 4);
        let first =
            monte_carlo_tree_search(&state, &config, &mut RngState::from_seed(17)).unwrap();
        let second =
            monte_carlo_tree_search(&state, &config, &mut RngState::from_seed(17)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn decision_is_never_the_open_slot() {
        let config = MctsConfig {
            time_limit_ms: 60_000,
            max_simulations: 32,
            exploration_weight: 1.414,
        };
        for seed in 0..8 {
            let state = DeckState::new(fixture(), seed);
            let slot = state.current_slot().unwrap();
            let mut rng = RngState::from_seed(seed);
            let action = monte_carlo_tree_search(&state, &config, &mut rng).unwrap();
            assert_ne!(action, slot);
            assert!(action < 4);
        }
    }

    #[test]
    fn unvisited_children_are_preferred() {
        let mut rng = RngState::from_seed(1);
        let state = DeckState::new(fixture(), 1);
        let mut node = Node::new(state, None, None, &mut rng);
        node.visits = 0;
        assert!(uct_value(&node, 10, 1.414).is_infinite());
        node.visits = 3;
        node.value_sum = 30.0;
        assert!(uct_value(&node, 10, 1.414).is_finite());
    }

    #[test]
    fn zero_parent_visits_degrades_to_a_flat_bonus() {
        let mut rng = RngState::from_seed(2);
        let state = DeckState::new(fixture(), 2);
        let mut node = Node::new(state, None, None, &mut rng);
        node.visits = 2;
        node.value_sum = 10.0;
        assert_eq!(uct_value(&node, 0, 1.5), 5.0 + 1.5);
    }
}
