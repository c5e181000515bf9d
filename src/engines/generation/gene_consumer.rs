use crate::engines::generation::genome::Genome;
use crate::engines::grammar::Grammar;
use crate::error::{Result, SgeError};
use crate::types::NonTerminalId;

/// Deterministically consumes gene slots during one mapping pass.
///
/// Keeps one position per non-terminal; every expansion of a non-terminal
/// reads the next unused slot of its gene.
pub struct GeneConsumer<'a> {
    grammar: &'a Grammar,
    genome: &'a Genome,
    positions: Vec<usize>,
}

impl<'a> GeneConsumer<'a> {
    /// Fails if `genome` is not shaped for `grammar`
    pub fn new(grammar: &'a Grammar, genome: &'a Genome) -> Result<Self> {
        genome.validate(grammar)?;

        Ok(Self {
            grammar,
            genome,
            positions: vec![0; genome.len()],
        })
    }

    /// Consume the next slot of `id` and return the chosen production index
    pub fn consume(&mut self, id: NonTerminalId) -> Result<usize> {
        let gene = self.genome.gene(id);
        let position = self.positions[id.index()];

        let value = *gene.get(position).ok_or_else(|| SgeError::SlotsExhausted {
            non_terminal: self.grammar.name_of(id).to_string(),
            slots: gene.len(),
        })?;

        let productions = self.grammar.production_count(id);
        if value as usize >= productions {
            return Err(SgeError::GeneOutOfRange {
                non_terminal: self.grammar.name_of(id).to_string(),
                value,
                productions,
            });
        }

        self.positions[id.index()] += 1;
        Ok(value as usize)
    }

    pub fn position(&self, id: NonTerminalId) -> usize {
        self.positions[id.index()]
    }

    /// Slots used per non-terminal
    pub fn into_positions(self) -> Vec<usize> {
        self.positions
    }
}
