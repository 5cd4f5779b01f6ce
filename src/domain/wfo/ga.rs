//! Population, tournament selection, uniform crossover, Gaussian mutation,
//! elitism, and early stopping.

use super::param_space::{project_constraints, ParamSpace, ParamVec};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct Individual {
    pub params: ParamVec,
    pub fitness: Option<f64>,
}

impl Individual {
    fn fitness_or_worst(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GaConfig {
    pub population_size: usize,
    pub num_generations: usize,
    pub tournament_size: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub mutation_sigma_pct: f64,
    pub elitism_count: usize,
    pub early_stopping_generations: usize,
    pub seed: Option<u64>,
    /// Evaluate each generation's candidates across a rayon thread pool
    /// instead of sequentially. Evaluation order never affects `best_ever`
    /// since selection keys purely on fitness value.
    pub parallel: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 32,
            num_generations: 8,
            tournament_size: 3,
            crossover_rate: 0.8,
            mutation_rate: 0.15,
            mutation_sigma_pct: 0.10,
            elitism_count: 2,
            early_stopping_generations: 3,
            seed: None,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRecord {
    pub gen: usize,
    pub best_fitness: f64,
    pub avg_fitness_finite: f64,
    pub evaluations: usize,
}

/// Samples a standard normal via Box-Muller; kept hand-rolled rather than
/// pulling in a distributions crate the rest of the codebase doesn't use.
fn sample_standard_normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.random_range(f64::EPSILON..1.0);
    let u2: f64 = rng.random_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn tournament_select<'a>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut impl Rng,
) -> &'a Individual {
    let mut best: Option<&Individual> = None;
    let mut chosen = std::collections::HashSet::new();
    let k = tournament_size.min(population.len());
    while chosen.len() < k {
        let idx = rng.random_range(0..population.len());
        if chosen.insert(idx) {
            let candidate = &population[idx];
            if best.is_none_or(|b: &Individual| candidate.fitness_or_worst() > b.fitness_or_worst())
            {
                best = Some(candidate);
            }
        }
    }
    best.expect("tournament always selects at least one competitor")
}

fn crossover_uniform(
    space: &ParamSpace,
    parent1: &ParamVec,
    parent2: &ParamVec,
    rng: &mut impl Rng,
) -> ParamVec {
    let mut child = ParamVec::new();
    for &name in space.defs.keys() {
        let from_first: bool = rng.random_bool(0.5);
        let gene = if from_first { parent1[name] } else { parent2[name] };
        child.insert(name, gene);
    }
    child
}

fn mutate_gaussian(space: &ParamSpace, params: &ParamVec, mutation_rate: f64, sigma_pct: f64, rng: &mut impl Rng) -> ParamVec {
    let mut out = params.clone();
    for (&name, def) in &space.defs {
        if rng.random_bool(mutation_rate) {
            let sigma = sigma_pct * (def.max - def.min);
            let delta = sample_standard_normal(rng) * sigma;
            *out.get_mut(name).expect("name present, inserted from space.defs") += delta;
        }
    }
    project_constraints(space, &out)
}

fn avg_fitness_finite(population: &[Individual]) -> f64 {
    let finite: Vec<f64> = population
        .iter()
        .filter_map(|ind| ind.fitness)
        .filter(|f| f.is_finite())
        .collect();
    if finite.is_empty() {
        0.0
    } else {
        finite.iter().sum::<f64>() / finite.len() as f64
    }
}

/// Evaluates every candidate's fitness, in parallel over a rayon pool when
/// `config.parallel` is set, sequentially otherwise. `evaluate` must be pure
/// given `params` — no shared mutable state — for the parallel path to stay
/// deterministic regardless of thread scheduling.
fn evaluate_all(
    population: &mut [Individual],
    config: &GaConfig,
    evaluate: &(impl Fn(&ParamVec) -> f64 + Sync),
) {
    if config.parallel {
        population
            .par_iter_mut()
            .for_each(|ind| ind.fitness = Some(evaluate(&ind.params)));
    } else {
        for ind in population.iter_mut() {
            ind.fitness = Some(evaluate(&ind.params));
        }
    }
}

/// Runs the genetic algorithm described by `config`, calling `evaluate` once
/// per candidate. `evaluate` must be pure given `params` for parallel
/// evaluation to stay deterministic.
pub fn optimize(
    space: &ParamSpace,
    config: &GaConfig,
    evaluate: impl Fn(&ParamVec) -> f64 + Sync,
) -> (Individual, Vec<GenerationRecord>) {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut population: Vec<Individual> = (0..config.population_size)
        .map(|_| {
            let params = project_constraints(space, &space.sample_random(&mut rng));
            Individual { params, fitness: None }
        })
        .collect();

    evaluate_all(&mut population, config, &evaluate);
    let mut evaluations = population.len();

    let mut best_ever = population
        .iter()
        .max_by(|a, b| a.fitness_or_worst().total_cmp(&b.fitness_or_worst()))
        .cloned()
        .expect("population_size must be > 0");

    let mut history = vec![GenerationRecord {
        gen: 0,
        best_fitness: best_ever.fitness_or_worst(),
        avg_fitness_finite: avg_fitness_finite(&population),
        evaluations,
    }];

    let mut stagnation = 0usize;

    for gen in 1..config.num_generations {
        let mut sorted = population.clone();
        sorted.sort_by(|a, b| b.fitness_or_worst().total_cmp(&a.fitness_or_worst()));
        let elites: Vec<Individual> = sorted.iter().take(config.elitism_count).cloned().collect();

        let needed = config.population_size.saturating_sub(config.elitism_count);
        let mut offspring = Vec::with_capacity(needed);
        for _ in 0..needed {
            let parent1 = tournament_select(&population, config.tournament_size, &mut rng);
            let parent2 = tournament_select(&population, config.tournament_size, &mut rng);
            let child_params = if rng.random_bool(config.crossover_rate) {
                crossover_uniform(space, &parent1.params, &parent2.params, &mut rng)
            } else {
                parent1.params.clone()
            };
            let mutated = mutate_gaussian(
                space,
                &child_params,
                config.mutation_rate,
                config.mutation_sigma_pct,
                &mut rng,
            );
            offspring.push(Individual {
                params: mutated,
                fitness: None,
            });
        }

        evaluate_all(&mut offspring, config, &evaluate);
        evaluations += offspring.len();

        population = elites.into_iter().chain(offspring).collect();

        let gen_best = population
            .iter()
            .max_by(|a, b| a.fitness_or_worst().total_cmp(&b.fitness_or_worst()))
            .cloned()
            .expect("population never empty");

        if gen_best.fitness_or_worst() > best_ever.fitness_or_worst() {
            best_ever = gen_best;
            stagnation = 0;
        } else {
            stagnation += 1;
        }

        history.push(GenerationRecord {
            gen,
            best_fitness: best_ever.fitness_or_worst(),
            avg_fitness_finite: avg_fitness_finite(&population),
            evaluations,
        });

        if stagnation >= config.early_stopping_generations {
            break;
        }
    }

    (best_ever, history)
}
