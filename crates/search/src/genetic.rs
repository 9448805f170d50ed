use crate::{simulated_annealing, AnnealConfig, AnnealOutcome, GeneticConfig};
use deckopt_core::{OpponentMatrix, RngState};
use serde::{Deserialize, Serialize};

/// One candidate set of annealing hyperparameters. Fitness is the best
/// score of a full annealing run under those parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Individual {
    pub start_temp: f64,
    pub end_temp: f64,
    pub swap_rate: f64,
    pub fitness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub best_fitness: f64,
    pub mean_fitness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticOutcome {
    pub best: Individual,
    pub best_deck: Vec<i32>,
    pub history: Vec<GenerationStats>,
}

fn random_individual(rng: &mut RngState) -> Individual {
    Individual {
        start_temp: rng.gen_u64(100, 10_000) as f64,
        // A power of ten in 1e-6..=1e-2.
        end_temp: 10f64.powi(-(rng.gen_u64(2, 6) as i32)),
        swap_rate: rng.gen_f64(0.01, 0.3),
        fitness: f64::NEG_INFINITY,
    }
}

fn crossover(p1: &Individual, p2: &Individual) -> Individual {
    Individual {
        start_temp: (p1.start_temp + p2.start_temp) / 2.0,
        // Geometric mean keeps the end temperature on its log scale.
        end_temp: (p1.end_temp * p2.end_temp).sqrt(),
        swap_rate: (p1.swap_rate + p2.swap_rate) / 2.0,
        fitness: f64::NEG_INFINITY,
    }
}

fn mutate(individual: &mut Individual, rate: f64, rng: &mut RngState) {
    if rng.gen_unit() < rate {
        individual.start_temp *= rng.gen_f64(0.8, 1.2);
    }
    if rng.gen_unit() < rate {
        individual.end_temp *= rng.gen_f64(0.8, 1.2);
    }
    if rng.gen_unit() < rate {
        individual.swap_rate *= rng.gen_f64(0.8, 1.2);
    }
}

fn anneal_config_for(individual: &Individual, config: &GeneticConfig) -> AnnealConfig {
    AnnealConfig {
        start_temp: individual.start_temp,
        end_temp: individual.end_temp,
        swap_rate: individual.swap_rate,
        time_limit_ms: config.anneal_time_limit_ms,
        max_iterations: config.anneal_max_iterations,
    }
}

/// Elitist genetic search over annealing hyperparameters. Every fitness
/// evaluation is a full timed annealing run, so generation counts stay small.
pub fn tune_annealing(
    matrix: &OpponentMatrix,
    config: &GeneticConfig,
    rng: &mut RngState,
) -> GeneticOutcome {
    let population_size = config.population.max(1);

    let mut evaluate = |individual: &mut Individual, rng: &mut RngState| -> AnnealOutcome {
        let outcome = simulated_annealing(matrix, &anneal_config_for(individual, config), rng);
        individual.fitness = outcome.best_score;
        outcome
    };

    let mut best = random_individual(rng);
    let mut best_outcome = evaluate(&mut best, rng);
    let mut population = vec![best.clone()];
    for _ in 1..population_size {
        let mut individual = random_individual(rng);
        let outcome = evaluate(&mut individual, rng);
        if individual.fitness > best.fitness {
            best = individual.clone();
            best_outcome = outcome;
        }
        population.push(individual);
    }

    let elite = config.elite.clamp(1, population_size);
    let mut history = Vec::with_capacity(config.generations as usize);

    for generation in 0..config.generations {
        population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        history.push(GenerationStats {
            generation,
            best_fitness: population[0].fitness,
            mean_fitness: population.iter().map(|i| i.fitness).sum::<f64>()
                / population.len() as f64,
        });

        let mut next: Vec<Individual> = population[..elite].to_vec();
        while next.len() < population_size {
            let p1 = &population[rng.gen_index(elite)];
            let p2 = &population[rng.gen_index(elite)];
            let mut child = crossover(p1, p2);
            mutate(&mut child, config.mutation_rate, rng);
            let outcome = evaluate(&mut child, rng);
            if child.fitness > best.fitness {
                best = child.clone();
                best_outcome = outcome;
            }
            next.push(child);
        }
        population = next;
    }

    GeneticOutcome {
        best,
        best_deck: best_outcome.best_deck,
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> OpponentMatrix {
        OpponentMatrix::from_rows(vec![
            vec![1, 4, 2, 3],
            vec![3, 2, 4, 1],
            vec![4, 1, 3, 2],
            vec![2, 3, 1, 4],
        ])
        .unwrap()
    }

    fn config() -> GeneticConfig {
        GeneticConfig {
            population: 4,
            generations: 3,
            elite: 2,
            mutation_rate: 0.3,
            anneal_time_limit_ms: 30_000,
            anneal_max_iterations: 25,
        }
    }

    #[test]
    fn random_individuals_stay_in_their_ranges() {
        let mut rng = RngState::from_seed(15);
        for _ in 0..50 {
            let individual = random_individual(&mut rng);
            assert!((100.0..=10_000.0).contains(&individual.start_temp));
            assert!((1e-6..=1e-2).contains(&individual.end_temp));
            assert!((0.01..0.3).contains(&individual.swap_rate));
        }
    }

    #[test]
    fn crossover_averages_and_geo_averages() {
        let p1 = Individual {
            start_temp: 200.0,
            end_temp: 1e-2,
            swap_rate: 0.1,
            fitness: 0.0,
        };
        let p2 = Individual {
            start_temp: 400.0,
            end_temp: 1e-4,
            swap_rate: 0.2,
            fitness: 0.0,
        };
        let child = crossover(&p1, &p2);
        assert_eq!(child.start_temp, 300.0);
        assert!((child.end_temp - 1e-3).abs() < 1e-12);
        assert!((child.swap_rate - 0.15).abs() < 1e-12);
    }

    #[test]
    fn per_generation_best_never_regresses() {
        let matrix = fixture();
        let outcome = tune_annealing(&matrix, &config(), &mut RngState::from_seed(10));
        assert_eq!(outcome.history.len(), 3);
        for pair in outcome.history.windows(2) {
            assert!(pair[1].best_fitness >= pair[0].best_fitness);
        }
    }

    #[test]
    fn reported_best_dominates_every_generation() {
        let matrix = fixture();
        let outcome = tune_annealing(&matrix, &config(), &mut RngState::from_seed(3));
        for stats in &outcome.history {
            assert!(outcome.best.fitness >= stats.best_fitness);
            assert!(stats.best_fitness >= stats.mean_fitness);
        }
        assert_eq!(outcome.best_deck.len(), 4);
        assert_eq!(outcome.best.fitness, matrix.score_deck(&outcome.best_deck));
    }

    #[test]
    fn single_generation_zero_history() {
        let matrix = fixture();
        let mut tiny = config();
        tiny.generations = 0;
        let outcome = tune_annealing(&matrix, &tiny, &mut RngState::from_seed(2));
        assert!(outcome.history.is_empty());
        assert!(outcome.best.fitness.is_finite());
    }
}
