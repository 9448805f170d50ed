use crate::{OpponentMatrix, RngState};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("action {0} is outside the deck")]
    InvalidAction(usize),
    #[error("deck is already fully placed")]
    DeckComplete,
    #[error("cards must be a permutation of 1..={0}")]
    NotAPermutation(usize),
    #[error("placement order must be a permutation of 0..{0}")]
    BadPlacementOrder(usize),
}

/// One in-progress deck: the permutation being assembled, the externally
/// fixed order in which slots open up, and the cached score. Cloning is a
/// plain value copy; only the opponent matrix is shared, read-only.
#[derive(Debug, Clone)]
pub struct DeckState {
    matrix: Arc<OpponentMatrix>,
    cards: Vec<i32>,
    placement_order: Vec<usize>,
    turn: usize,
    score: f64,
    first_action: Option<usize>,
}

impl DeckState {
    pub fn new(matrix: Arc<OpponentMatrix>, seed: u64) -> Self {
        let n = matrix.size();
        let mut rng = RngState::from_seed(seed);
        let mut cards: Vec<i32> = (1..=n as i32).collect();
        rng.shuffle(&mut cards);
        let mut placement_order: Vec<usize> = (0..n).collect();
        rng.shuffle(&mut placement_order);
        let score = matrix.score_deck(&cards);
        Self {
            matrix,
            cards,
            placement_order,
            turn: 0,
            score,
            first_action: None,
        }
    }

    /// Build a state from explicit parts, for deterministic fixtures.
    pub fn from_parts(
        matrix: Arc<OpponentMatrix>,
        cards: Vec<i32>,
        placement_order: Vec<usize>,
    ) -> Result<Self, StateError> {
        let n = matrix.size();
        let mut seen_cards = vec![false; n];
        if cards.len() != n {
            return Err(StateError::NotAPermutation(n));
        }
        for &card in &cards {
            if card < 1 || card as usize > n || seen_cards[card as usize - 1] {
                return Err(StateError::NotAPermutation(n));
            }
            seen_cards[card as usize - 1] = true;
        }
        let mut seen_slots = vec![false; n];
        if placement_order.len() != n {
            return Err(StateError::BadPlacementOrder(n));
        }
        for &slot in &placement_order {
            if slot >= n || seen_slots[slot] {
                return Err(StateError::BadPlacementOrder(n));
            }
            seen_slots[slot] = true;
        }
        let score = matrix.score_deck(&cards);
        Ok(Self {
            matrix,
            cards,
            placement_order,
            turn: 0,
            score,
            first_action: None,
        })
    }

    pub fn cards(&self) -> &[i32] {
        &self.cards
    }

    pub fn placement_order(&self) -> &[usize] {
        &self.placement_order
    }

    pub fn matrix(&self) -> &Arc<OpponentMatrix> {
        &self.matrix
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn first_action(&self) -> Option<usize> {
        self.first_action
    }

    pub fn set_first_action(&mut self, action: usize) {
        self.first_action = Some(action);
    }

    /// The slot currently open for placement, `None` once the deck is done.
    pub fn current_slot(&self) -> Option<usize> {
        self.placement_order.get(self.turn).copied()
    }

    pub fn is_done(&self) -> bool {
        self.turn == self.cards.len()
    }

    /// Every position except the open slot. Fresh vector per call.
    pub fn legal_actions(&self) -> Vec<usize> {
        let Some(slot) = self.current_slot() else {
            return Vec::new();
        };
        (0..self.cards.len()).filter(|&i| i != slot).collect()
    }

    /// Swap the open slot with `action`, re-score, and advance the cursor.
    /// Out-of-range actions and advancing a finished deck are errors, not
    /// clamped no-ops.
    pub fn advance(&mut self, action: usize) -> Result<(), StateError> {
        let slot = self.current_slot().ok_or(StateError::DeckComplete)?;
        if action >= self.cards.len() {
            return Err(StateError::InvalidAction(action));
        }
        self.cards.swap(slot, action);
        self.score = self.evaluate();
        self.turn += 1;
        Ok(())
    }

    /// Pure scoring pass over the full deck, unfilled slots included: the
    /// deck is always a complete permutation, only partially finalized.
    pub fn evaluate(&self) -> f64 {
        self.matrix.score_deck(&self.cards)
    }
}
