use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a non-terminal in the grammar's ordered non-terminal list.
///
/// The order is fixed once the grammar is finalized and doubles as the
/// genome's gene order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NonTerminalId(pub u32);

impl NonTerminalId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for NonTerminalId {
    fn from(index: usize) -> Self {
        NonTerminalId(index as u32)
    }
}

/// Grammar symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Literal output text, possibly empty
    Terminal(String),
    NonTerminal(NonTerminalId),
}

impl Symbol {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn non_terminal(&self) -> Option<NonTerminalId> {
        match self {
            Symbol::NonTerminal(id) => Some(*id),
            Symbol::Terminal(_) => None,
        }
    }
}

/// One alternative right-hand side of a rule
pub type Production = Vec<Symbol>;

/// Derivation tree produced by tree mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DerivationTree {
    Leaf(String),
    Node {
        non_terminal: String,
        children: Vec<DerivationTree>,
    },
}

impl DerivationTree {
    /// Concatenated terminal text, without the indentation filter applied
    pub fn phenotype(&self) -> String {
        let mut out = String::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut String) {
        match self {
            DerivationTree::Leaf(text) => out.push_str(text),
            DerivationTree::Node { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            DerivationTree::Leaf(_) => 1,
            DerivationTree::Node { children, .. } => {
                1 + children.iter().map(|c| c.depth()).max().unwrap_or(0)
            }
        }
    }
}

impl fmt::Display for DerivationTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivationTree::Leaf(text) => write!(f, "{:?}", text),
            DerivationTree::Node { non_terminal, children } => {
                write!(f, "({}", non_terminal)?;
                for child in children {
                    write!(f, " {}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}
