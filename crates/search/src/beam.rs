use crate::{strategy::uniform_legal_action, BeamConfig, SearchError};
use deckopt_core::{DeckState, RngState};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct BeamEntry {
    score: f64,
    seq: u64,
    state: DeckState,
}

impl PartialEq for BeamEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BeamEntry {}

impl PartialOrd for BeamEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BeamEntry {
    // Max-heap on score; equal scores resolve to the earlier insertion.
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then(other.seq.cmp(&self.seq))
    }
}

/// Width-bounded frontier search. Expands the `width` best states per depth
/// level and returns the depth-0 action of the best lineage.
pub fn beam_search(
    state: &DeckState,
    config: &BeamConfig,
    rng: &mut RngState,
) -> Result<usize, SearchError> {
    let mut seq = 0u64;
    let mut now_beam = BinaryHeap::new();
    now_beam.push(BeamEntry {
        score: state.score(),
        seq,
        state: state.clone(),
    });
    seq += 1;

    let mut best: Option<DeckState> = None;
    for depth in 0..config.depth {
        let mut next_beam = BinaryHeap::new();
        for _ in 0..config.width {
            let Some(entry) = now_beam.pop() else {
                break;
            };
            for action in entry.state.legal_actions() {
                let mut child = entry.state.clone();
                child.advance(action)?;
                if depth == 0 {
                    child.set_first_action(action);
                }
                next_beam.push(BeamEntry {
                    score: child.score(),
                    seq,
                    state: child,
                });
                seq += 1;
            }
        }

        let top_state = {
            let Some(top) = next_beam.peek() else {
                break;
            };
            top.state.clone()
        };
        now_beam = next_beam;
        let done = top_state.is_done();
        best = Some(top_state);
        if done {
            break;
        }
    }

    match best.and_then(|state| state.first_action()) {
        Some(action) => Ok(action),
        // Budget produced no decision; fall back to a random legal action.
        None => uniform_legal_action(state, rng),
    }
}
