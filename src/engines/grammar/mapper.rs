use crate::engines::generation::{gene_consumer::GeneConsumer, genome::Genome};
use crate::engines::grammar::{filter, Grammar};
use crate::error::Result;
use crate::types::{DerivationTree, NonTerminalId, Symbol};
use std::collections::VecDeque;

/// Result of mapping a genome to text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub phenotype: String,
    /// Slots consumed per non-terminal
    pub mapping_values: Vec<usize>,
}

/// Genotype to phenotype mapper.
///
/// Both modes expand the leftmost non-terminal first, so they consume gene
/// slots in the same order.
pub struct Mapper<'g> {
    grammar: &'g Grammar,
}

impl<'g> Mapper<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    /// Expand from the start symbol with a work queue and filter the output
    pub fn map(&self, genome: &Genome) -> Result<Mapping> {
        let mut consumer = GeneConsumer::new(self.grammar, genome)?;
        let start = Symbol::NonTerminal(self.grammar.start());
        let mut queue: VecDeque<&Symbol> = VecDeque::from([&start]);
        let mut output = String::new();

        while let Some(symbol) = queue.pop_front() {
            match symbol {
                Symbol::Terminal(text) => output.push_str(text),
                Symbol::NonTerminal(id) => {
                    let choice = consumer.consume(*id)?;
                    let production = &self.grammar.productions(*id)[choice];
                    for next in production.iter().rev() {
                        queue.push_front(next);
                    }
                }
            }
        }

        Ok(Mapping {
            phenotype: filter::apply(&output),
            mapping_values: consumer.into_positions(),
        })
    }

    /// Build the derivation tree depth-first.
    ///
    /// Returns the tree with the slots consumed per non-terminal.
    pub fn derivation_tree(&self, genome: &Genome) -> Result<(DerivationTree, Vec<usize>)> {
        let mut consumer = GeneConsumer::new(self.grammar, genome)?;
        let tree = self.expand(self.grammar.start(), &mut consumer)?;
        Ok((tree, consumer.into_positions()))
    }

    fn expand(&self, id: NonTerminalId, consumer: &mut GeneConsumer) -> Result<DerivationTree> {
        let choice = consumer.consume(id)?;
        let children = self.grammar.productions(id)[choice]
            .iter()
            .map(|symbol| match symbol {
                Symbol::Terminal(text) => Ok(DerivationTree::Leaf(text.clone())),
                Symbol::NonTerminal(child) => self.expand(*child, consumer),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DerivationTree::Node {
            non_terminal: self.grammar.name_of(id).to_string(),
            children,
        })
    }
}
