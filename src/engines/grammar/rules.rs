use crate::engines::grammar::{loader, recursion, references};
use crate::error::{Result, SgeError};
use crate::types::{NonTerminalId, Production, Symbol};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

pub const DEFAULT_MAX_RECURSION_LEVEL: usize = 3;

/// Mutable production table shared by the loader and the recursion eliminator
#[derive(Debug, Clone, Default)]
pub(crate) struct RuleTable {
    pub names: Vec<String>,
    pub index: HashMap<String, NonTerminalId>,
    pub rules: Vec<Vec<Production>>,
    pub terminals: BTreeSet<String>,
}

impl RuleTable {
    /// Register a non-terminal with an empty rule, returning its id.
    /// Existing names keep their id.
    pub fn intern(&mut self, name: &str) -> NonTerminalId {
        if let Some(id) = self.index.get(name) {
            return *id;
        }
        let id = NonTerminalId::from(self.names.len());
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        self.rules.push(Vec::new());
        id
    }

    pub fn name(&self, id: NonTerminalId) -> &str {
        &self.names[id.index()]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// A finalized, non-recursive grammar with its reference-count table.
///
/// The grammar is immutable once built; genome operators and the mapper
/// receive it explicitly.
#[derive(Debug, Clone)]
pub struct Grammar {
    table: RuleTable,
    start: NonTerminalId,
    reference_counts: Vec<usize>,
    max_recursion_level: usize,
}

impl Grammar {
    /// Load, unroll recursion and count references in one step
    pub fn from_source(source: &str, max_recursion_level: usize) -> Result<Self> {
        let (mut table, start) = loader::parse_grammar(source)?;
        log::debug!(
            "Parsed {} rules with start symbol {}",
            table.len(),
            table.name(start)
        );

        recursion::eliminate_direct_recursion(&mut table, max_recursion_level)?;
        recursion::check_indirect_recursion(&table)?;

        let reference_counts = references::count_references(&table, start);
        log::debug!(
            "Reference counts: {:?}",
            table.names.iter().zip(&reference_counts).collect::<Vec<_>>()
        );

        Ok(Self {
            table,
            start,
            reference_counts,
            max_recursion_level,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P, max_recursion_level: usize) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            SgeError::Configuration(format!(
                "Failed to read grammar {}: {}",
                path.display(),
                e
            ))
        })?;
        let grammar = Self::from_source(&source, max_recursion_level)?;
        log::info!(
            "Loaded grammar {} ({} non-terminals)",
            path.display(),
            grammar.len()
        );
        Ok(grammar)
    }

    pub fn start(&self) -> NonTerminalId {
        self.start
    }

    /// Number of non-terminals, which is also the genome length
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.names.is_empty()
    }

    pub fn max_recursion_level(&self) -> usize {
        self.max_recursion_level
    }

    /// Non-terminal names in genome order
    pub fn non_terminals(&self) -> &[String] {
        &self.table.names
    }

    pub fn ids(&self) -> impl Iterator<Item = NonTerminalId> {
        (0..self.len()).map(NonTerminalId::from)
    }

    pub fn id_of(&self, name: &str) -> Option<NonTerminalId> {
        self.table.index.get(name).copied()
    }

    pub fn name_of(&self, id: NonTerminalId) -> &str {
        self.table.name(id)
    }

    pub fn terminals(&self) -> &BTreeSet<String> {
        &self.table.terminals
    }

    pub fn productions(&self, id: NonTerminalId) -> &[Production] {
        &self.table.rules[id.index()]
    }

    pub fn production_count(&self, id: NonTerminalId) -> usize {
        self.table.rules[id.index()].len()
    }

    /// Number of gene slots provisioned for a non-terminal
    pub fn reference_count(&self, id: NonTerminalId) -> usize {
        self.reference_counts.get(id.index()).copied().unwrap_or(1)
    }

    /// Reference-count table keyed by non-terminal name
    pub fn reference_counts(&self) -> HashMap<String, usize> {
        self.table
            .names
            .iter()
            .cloned()
            .zip(self.reference_counts.iter().copied())
            .collect()
    }

    fn write_production(&self, f: &mut fmt::Formatter<'_>, production: &Production) -> fmt::Result {
        for symbol in production {
            match symbol {
                Symbol::Terminal(text) => write!(f, "{}", text)?,
                Symbol::NonTerminal(id) => write!(f, "{}", self.name_of(*id))?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.ids() {
            write!(f, "{} ::= ", self.name_of(id))?;
            for (i, production) in self.productions(id).iter().enumerate() {
                if i > 0 {
                    write!(f, " | ")?;
                }
                self.write_production(f, production)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
