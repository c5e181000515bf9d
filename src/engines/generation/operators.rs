use crate::engines::generation::{genome::Genome, individual::Individual};
use crate::engines::grammar::Grammar;
use rand::seq::index;
use rand::Rng;

/// Per-gene probability of inheriting from the first parent
const CROSSOVER_MASK_THRESHOLD: f64 = 0.5;

/// Generate random genome shaped by the grammar's reference counts
pub fn random_genome<R: Rng>(grammar: &Grammar, rng: &mut R) -> Genome {
    let genes = grammar
        .ids()
        .map(|id| {
            let productions = grammar.production_count(id) as u32;
            (0..grammar.reference_count(id))
                .map(|_| rng.gen_range(0..productions))
                .collect()
        })
        .collect();
    Genome::new(genes)
}

/// Tournament selection: copy of the best of K distinct random candidates.
///
/// Panics if the population is empty.
pub fn tournament_selection<R: Rng>(
    population: &[Individual],
    tournament_size: usize,
    rng: &mut R,
) -> Individual {
    let amount = tournament_size.clamp(1, population.len().max(1));
    let best = index::sample(rng, population.len(), amount)
        .into_iter()
        .min_by(|&a, &b| {
            population[a]
                .fitness_key()
                .total_cmp(&population[b].fitness_key())
        })
        .unwrap_or(0);

    population[best].clone()
}

/// Uniform crossover at gene level: each non-terminal's whole gene comes
/// from one parent.
///
/// The child's consumption counters are the element-wise maximum of the
/// parents', an upper bound on the slots the child's mutation may target.
pub fn crossover<R: Rng>(parent1: &Individual, parent2: &Individual, rng: &mut R) -> Individual {
    let genes = parent1
        .genotype
        .genes()
        .iter()
        .zip(parent2.genotype.genes())
        .map(|(gene1, gene2)| {
            if rng.gen::<f64>() < CROSSOVER_MASK_THRESHOLD {
                gene1.clone()
            } else {
                gene2.clone()
            }
        })
        .collect();

    let mapping_values = parent1
        .mapping_values
        .iter()
        .zip(&parent2.mapping_values)
        .map(|(a, b)| *a.max(b))
        .collect();

    Individual {
        mapping_values,
        ..Individual::new(Genome::new(genes))
    }
}

/// Mutation: with probability `mutation_rate` per gene, change one slot to
/// a different production.
///
/// Non-terminals with a single production are never touched. The slot is
/// picked among those consumed by the last mapping, or slot 0 if at most
/// one was used. Always clears the individual's evaluation.
pub fn mutate<R: Rng>(individual: &mut Individual, grammar: &Grammar, mutation_rate: f64, rng: &mut R) {
    individual.invalidate();

    for id in grammar.ids() {
        let productions = grammar.production_count(id) as u32;
        if productions <= 1 {
            continue;
        }
        if rng.gen::<f64>() >= mutation_rate {
            continue;
        }

        let used = individual.mapping_values.get(id.index()).copied().unwrap_or(0);
        let gene = individual.genotype.gene_mut(id);
        let position = if used > 1 {
            rng.gen_range(0..used.min(gene.len()))
        } else {
            0
        };

        // Uniform over every index except the current one
        let current = gene[position];
        let mut replacement = rng.gen_range(0..productions - 1);
        if replacement >= current {
            replacement += 1;
        }
        gene[position] = replacement;
    }
}
