use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BeamConfig {
    pub width: usize,
    pub depth: usize,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            width: 100,
            depth: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MctsConfig {
    pub time_limit_ms: u64,
    pub max_simulations: u32,
    pub exploration_weight: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 1000,
            max_simulations: 100_000,
            exploration_weight: 1.414,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnnealConfig {
    pub start_temp: f64,
    pub end_temp: f64,
    /// Fraction of the deck eligible for one neighbor batch; the swap count
    /// per iteration is drawn from `1..=floor(swap_rate * n)`.
    pub swap_rate: f64,
    pub time_limit_ms: u64,
    pub max_iterations: u64,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            start_temp: 1000.0,
            end_temp: 1e-4,
            swap_rate: 0.06,
            time_limit_ms: 2000,
            max_iterations: u64::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeneticConfig {
    pub population: usize,
    pub generations: u32,
    pub elite: usize,
    pub mutation_rate: f64,
    /// Budget for each fitness evaluation; every one is a full annealing run.
    pub anneal_time_limit_ms: u64,
    pub anneal_max_iterations: u64,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population: 20,
            generations: 30,
            elite: 4,
            mutation_rate: 0.3,
            anneal_time_limit_ms: 2000,
            anneal_max_iterations: u64::MAX,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverSettings {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub games: Option<u32>,
    #[serde(default)]
    pub beam: BeamConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub anneal: AnnealConfig,
    #[serde(default)]
    pub genetic: GeneticConfig,
}
