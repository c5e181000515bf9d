use crate::engines::grammar::rules::RuleTable;
use crate::error::{Result, SgeError};
use crate::types::{NonTerminalId, Production, Symbol};

/// Rewrite every directly self-recursive non-terminal into a bounded chain
/// of `<name_lvl_N>` non-terminals, `max_level + 1` levels deep.
///
/// Only rules that are touched get rebuilt; the rest of the table is left
/// in place.
pub(crate) fn eliminate_direct_recursion(table: &mut RuleTable, max_level: usize) -> Result<()> {
    // Chain levels are never self-recursive, so each original non-terminal
    // is rewritten at most once.
    let limit = table.len();
    let mut rewrites = 0;

    while let Some(nt) = find_self_recursive(table) {
        if rewrites >= limit {
            let name = table.name(nt).to_string();
            return Err(SgeError::UnboundedRecursion {
                cycle: vec![name.clone(), name],
            });
        }
        rewrite_recursive_rule(table, nt, max_level)?;
        rewrites += 1;
    }
    Ok(())
}

fn references(production: &Production, nt: NonTerminalId) -> bool {
    production.iter().any(|s| s.non_terminal() == Some(nt))
}

/// First non-terminal, in genome order, with a production mentioning itself
fn find_self_recursive(table: &RuleTable) -> Option<NonTerminalId> {
    (0..table.len())
        .map(NonTerminalId::from)
        .find(|&id| table.rules[id.index()].iter().any(|p| references(p, id)))
}

fn rewrite_recursive_rule(table: &mut RuleTable, nt: NonTerminalId, max_level: usize) -> Result<()> {
    let original = table.rules[nt.index()].clone();
    let base: Vec<Production> = original
        .iter()
        .filter(|p| !references(p, nt))
        .cloned()
        .collect();

    let name = table.name(nt).to_string();
    if base.is_empty() {
        return Err(SgeError::NoBaseCase { name });
    }

    let stub = &name[..name.len() - 1];
    let levels: Vec<NonTerminalId> = (0..=max_level)
        .map(|level| {
            let level_name = format!("{}_lvl_{}>", stub, level);
            if table.index.contains_key(&level_name) {
                return Err(SgeError::LevelNameCollision {
                    name: level_name,
                    recursive: name.clone(),
                });
            }
            Ok(table.intern(&level_name))
        })
        .collect::<Result<_>>()?;

    table.rules[nt.index()] = substitute(&original, nt, levels[0]);
    for level in 1..=max_level {
        table.rules[levels[level - 1].index()] = substitute(&original, nt, levels[level]);
    }
    table.rules[levels[max_level].index()] = original
        .iter()
        .flat_map(|production| expand_base_cases(production, &base, nt))
        .collect();

    log::debug!(
        "Unrolled {} into {} levels ({} base alternatives)",
        name,
        max_level + 1,
        base.len()
    );
    Ok(())
}

fn substitute(productions: &[Production], from: NonTerminalId, to: NonTerminalId) -> Vec<Production> {
    productions
        .iter()
        .map(|production| {
            production
                .iter()
                .map(|symbol| match symbol {
                    Symbol::NonTerminal(id) if *id == from => Symbol::NonTerminal(to),
                    other => other.clone(),
                })
                .collect()
        })
        .collect()
}

/// Replace each self-reference, left to right, by every base alternative.
/// A production with k self-references yields `base.len()^k` alternatives.
fn expand_base_cases(production: &Production, base: &[Production], nt: NonTerminalId) -> Vec<Production> {
    let Some(position) = production.iter().position(|s| s.non_terminal() == Some(nt)) else {
        return vec![production.clone()];
    };

    base.iter()
        .flat_map(|replacement| {
            let mut expanded = Vec::with_capacity(production.len() + replacement.len() - 1);
            expanded.extend_from_slice(&production[..position]);
            expanded.extend_from_slice(replacement);
            expanded.extend_from_slice(&production[position + 1..]);
            expand_base_cases(&expanded, base, nt)
        })
        .collect()
}

/// Reject grammars still cyclic after direct recursion was unrolled.
///
/// Mutual recursion cannot be given a finite reference count, so this
/// fails with the offending cycle instead of looping forever.
pub(crate) fn check_indirect_recursion(table: &RuleTable) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    fn visit(table: &RuleTable, id: NonTerminalId, marks: &mut [Mark], stack: &mut Vec<NonTerminalId>) -> Result<()> {
        marks[id.index()] = Mark::OnStack;
        stack.push(id);

        for production in &table.rules[id.index()] {
            for next in production.iter().filter_map(Symbol::non_terminal) {
                match marks[next.index()] {
                    Mark::Unvisited => visit(table, next, marks, stack)?,
                    Mark::OnStack => {
                        let start = stack.iter().position(|&s| s == next).unwrap_or(0);
                        let mut cycle: Vec<String> = stack[start..]
                            .iter()
                            .map(|&s| table.name(s).to_string())
                            .collect();
                        cycle.push(table.name(next).to_string());
                        return Err(SgeError::UnboundedRecursion { cycle });
                    }
                    Mark::Done => {}
                }
            }
        }

        stack.pop();
        marks[id.index()] = Mark::Done;
        Ok(())
    }

    let mut marks = vec![Mark::Unvisited; table.len()];
    let mut stack = Vec::new();
    for index in 0..table.len() {
        if marks[index] == Mark::Unvisited {
            visit(table, NonTerminalId::from(index), &mut marks, &mut stack)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::grammar::loader::parse_grammar;

    fn terminal_texts(table: &RuleTable, name: &str) -> Vec<String> {
        let id = table.index[name];
        table.rules[id.index()]
            .iter()
            .map(|p| {
                p.iter()
                    .map(|s| match s {
                        Symbol::Terminal(t) => t.clone(),
                        Symbol::NonTerminal(id) => table.name(*id).to_string(),
                    })
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn test_unrolls_binary_recursion() {
        let (mut table, _) = parse_grammar("<e> ::= <e>+<e> | n\n").unwrap();
        eliminate_direct_recursion(&mut table, 1).unwrap();

        assert_eq!(table.names, vec!["<e>", "<e_lvl_0>", "<e_lvl_1>"]);
        assert_eq!(terminal_texts(&table, "<e>"), vec!["<e_lvl_0>+<e_lvl_0>", "n"]);
        assert_eq!(terminal_texts(&table, "<e_lvl_0>"), vec!["<e_lvl_1>+<e_lvl_1>", "n"]);
        assert_eq!(terminal_texts(&table, "<e_lvl_1>"), vec!["n+n", "n"]);
    }

    #[test]
    fn test_deepest_level_is_cross_product_of_base_cases() {
        let (mut table, _) = parse_grammar("<e> ::= (<e>,<e>) | a | b\n").unwrap();
        eliminate_direct_recursion(&mut table, 0).unwrap();

        assert_eq!(
            terminal_texts(&table, "<e_lvl_0>"),
            vec!["(a,a)", "(a,b)", "(b,a)", "(b,b)", "a", "b"]
        );
    }

    #[test]
    fn test_no_self_reference_remains() {
        let (mut table, _) =
            parse_grammar("<s> ::= <l>;<e>\n<l> ::= <l>x | x\n<e> ::= <e>*<e> | <l>\n").unwrap();
        eliminate_direct_recursion(&mut table, 3).unwrap();

        assert!(find_self_recursive(&table).is_none());
        // two chains of max_level + 1
        assert_eq!(table.len(), 3 + 2 * 4);
    }

    #[test]
    fn test_missing_base_case_is_error() {
        let (mut table, _) = parse_grammar("<s> ::= <s>x\n").unwrap();
        let err = eliminate_direct_recursion(&mut table, 3).unwrap_err();
        assert!(matches!(err, SgeError::NoBaseCase { ref name } if name == "<s>"));
    }

    #[test]
    fn test_user_defined_level_name_is_error() {
        let (mut table, _) = parse_grammar("<e> ::= <e>+<e_lvl_1> | n\n<e_lvl_1> ::= m\n").unwrap();
        let err = eliminate_direct_recursion(&mut table, 2).unwrap_err();
        assert!(matches!(
            err,
            SgeError::LevelNameCollision { ref name, ref recursive } if name == "<e_lvl_1>" && recursive == "<e>"
        ));
    }

    #[test]
    fn test_mutual_recursion_detected() {
        let (mut table, _) = parse_grammar("<a> ::= <b> | x\n<b> ::= <a>y\n").unwrap();
        eliminate_direct_recursion(&mut table, 3).unwrap();

        match check_indirect_recursion(&table) {
            Err(SgeError::UnboundedRecursion { cycle }) => {
                assert_eq!(cycle, vec!["<a>", "<b>", "<a>"]);
            }
            other => panic!("expected cycle error, got {:?}", other),
        }
    }
}
