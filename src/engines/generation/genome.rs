use crate::engines::grammar::Grammar;
use crate::error::{Result, SgeError};
use crate::types::NonTerminalId;
use serde::{Deserialize, Serialize};

/// Choices for one non-terminal, one value per expansion slot
pub type Gene = Vec<u32>;

/// Structured genome: one gene per non-terminal, in grammar order.
///
/// Gene `i` holds `grammar.reference_count(i)` production indices, so the
/// genome's shape is dictated by the grammar it was generated for. Values
/// mutate, lengths never do.
///
/// ```text
/// <start> ::= <a><b>      gene 0: [0]
/// <a>     ::= x | y       gene 1: [0]     -> "x"
/// <b>     ::= 1 | 2       gene 2: [1]     -> "2"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    genes: Vec<Gene>,
}

impl Genome {
    pub fn new(genes: Vec<Gene>) -> Self {
        Self { genes }
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn gene(&self, id: NonTerminalId) -> &Gene {
        &self.genes[id.index()]
    }

    pub fn gene_mut(&mut self, id: NonTerminalId) -> &mut Gene {
        &mut self.genes[id.index()]
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Check gene count, gene lengths and value ranges against a grammar
    pub fn validate(&self, grammar: &Grammar) -> Result<()> {
        if self.genes.len() != grammar.len() {
            return Err(SgeError::ShapeMismatch {
                non_terminal: "genome".to_string(),
                expected: grammar.len(),
                actual: self.genes.len(),
            });
        }

        for id in grammar.ids() {
            let gene = self.gene(id);
            let expected = grammar.reference_count(id);
            if gene.len() != expected {
                return Err(SgeError::ShapeMismatch {
                    non_terminal: grammar.name_of(id).to_string(),
                    expected,
                    actual: gene.len(),
                });
            }

            let productions = grammar.production_count(id);
            if let Some(&value) = gene.iter().find(|&&v| v as usize >= productions) {
                return Err(SgeError::GeneOutOfRange {
                    non_terminal: grammar.name_of(id).to_string(),
                    value,
                    productions,
                });
            }
        }
        Ok(())
    }
}
