use crate::engines::grammar::rules::RuleTable;
use crate::error::{Result, SgeError};
use crate::types::{NonTerminalId, Production, Symbol};

const RULE_SEPARATOR: &str = "::=";
const PRODUCTION_SEPARATOR: char = '|';
const EMPTY_PRODUCTION: &str = "None";

/// Token of an alternative before non-terminal names are resolved
#[derive(Debug, Clone, PartialEq, Eq)]
enum RawSymbol {
    Terminal(String),
    NonTerminal(String),
}

struct RawRule {
    line: usize,
    lhs: String,
    alternatives: Vec<Vec<RawSymbol>>,
}

/// Parse BNF source into a rule table and its start symbol.
///
/// Non-terminal ids follow the order in which left-hand sides are first
/// seen, so the start symbol is always id 0.
pub(crate) fn parse_grammar(source: &str) -> Result<(RuleTable, NonTerminalId)> {
    let mut raw_rules = Vec::new();
    for (i, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || line.starts_with('#') {
            continue;
        }
        raw_rules.push(parse_rule_line(i + 1, line)?);
    }

    if raw_rules.is_empty() {
        return Err(SgeError::EmptyGrammar);
    }

    let mut table = RuleTable::default();
    let mut defined = Vec::with_capacity(raw_rules.len());
    for rule in &raw_rules {
        if table.index.contains_key(&rule.lhs) {
            log::warn!(
                "Line {}: duplicate definition of {} ignored",
                rule.line,
                rule.lhs
            );
            defined.push(false);
            continue;
        }
        table.intern(&rule.lhs);
        defined.push(true);
    }

    for (rule, is_definition) in raw_rules.into_iter().zip(defined) {
        if !is_definition {
            continue;
        }
        let productions = rule
            .alternatives
            .into_iter()
            .map(|alternative| resolve_alternative(&mut table, alternative))
            .collect::<Result<Vec<Production>>>()?;
        let id = table.index[&rule.lhs];
        table.rules[id.index()] = productions;
    }

    Ok((table, NonTerminalId(0)))
}

fn parse_rule_line(line_no: usize, line: &str) -> Result<RawRule> {
    let (lhs, rhs) = line.split_once(RULE_SEPARATOR).ok_or_else(|| SgeError::GrammarFormat {
        line: line_no,
        message: format!("missing '{}' separator", RULE_SEPARATOR),
    })?;

    let lhs = lhs.trim();
    if !is_non_terminal_token(lhs) {
        return Err(SgeError::GrammarFormat {
            line: line_no,
            message: format!("left side {:?} is not a non-terminal", lhs),
        });
    }

    let alternatives = rhs
        .split(PRODUCTION_SEPARATOR)
        .map(|alternative| tokenize_alternative(alternative.trim()))
        .collect();

    Ok(RawRule {
        line: line_no,
        lhs: lhs.to_string(),
        alternatives,
    })
}

fn is_non_terminal_token(token: &str) -> bool {
    token.len() > 2
        && token.starts_with('<')
        && token.ends_with('>')
        && !token[1..token.len() - 1].contains(['<', '>'])
}

/// Split an alternative into `<...>` tokens and the terminal text between them
fn tokenize_alternative(alternative: &str) -> Vec<RawSymbol> {
    if alternative == EMPTY_PRODUCTION {
        return vec![RawSymbol::Terminal(String::new())];
    }

    let mut symbols = Vec::new();
    let mut text = String::new();
    let mut rest = alternative;

    while let Some(open) = rest.find('<') {
        let after_open = &rest[open + 1..];
        // Needs at least one character between the brackets
        let close = after_open
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '>')
            .map(|(i, _)| i);

        match close {
            Some(close) if !after_open[..close].contains('<') => {
                text.push_str(&rest[..open]);
                if !text.is_empty() {
                    symbols.push(RawSymbol::Terminal(std::mem::take(&mut text)));
                }
                symbols.push(RawSymbol::NonTerminal(rest[open..open + close + 2].to_string()));
                rest = &after_open[close + 1..];
            }
            _ => {
                text.push_str(&rest[..=open]);
                rest = after_open;
            }
        }
    }
    text.push_str(rest);
    if !text.is_empty() || symbols.is_empty() {
        symbols.push(RawSymbol::Terminal(text));
    }
    symbols
}

fn resolve_alternative(table: &mut RuleTable, alternative: Vec<RawSymbol>) -> Result<Production> {
    alternative
        .into_iter()
        .map(|symbol| match symbol {
            RawSymbol::Terminal(text) => {
                table.terminals.insert(text.clone());
                Ok(Symbol::Terminal(text))
            }
            RawSymbol::NonTerminal(name) => table
                .index
                .get(&name)
                .map(|id| Symbol::NonTerminal(*id))
                .ok_or(SgeError::UndefinedNonTerminal { name }),
        })
        .collect()
}
