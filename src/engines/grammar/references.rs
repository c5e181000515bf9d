use crate::engines::grammar::rules::RuleTable;
use crate::types::NonTerminalId;
use std::collections::BTreeMap;

/// Compute the worst-case number of expansions of every non-terminal in a
/// single derivation, indexed by `NonTerminalId`.
///
/// For a target `T` referenced by rules `R1..Rn`, where `d(T, Ri)` is the
/// largest number of times a single production of `Ri` mentions `T`:
///
/// ```text
/// count(T) = (d(T, R1) + ... + d(T, Rn)) * max(count(R1), ..., count(Rn))
/// ```
///
/// The start symbol and unreferenced non-terminals count 1. The product
/// over-provisions for asymmetric grammars but never under-provisions.
/// The table must be acyclic.
pub(crate) fn count_references(table: &RuleTable, start: NonTerminalId) -> Vec<usize> {
    // referenced_by[T][R] = d(T, R)
    let mut referenced_by: Vec<BTreeMap<NonTerminalId, usize>> = vec![BTreeMap::new(); table.len()];

    for (index, productions) in table.rules.iter().enumerate() {
        let referrer = NonTerminalId::from(index);
        for production in productions {
            let mut occurrences: BTreeMap<NonTerminalId, usize> = BTreeMap::new();
            for id in production.iter().filter_map(|s| s.non_terminal()) {
                *occurrences.entry(id).or_insert(0) += 1;
            }
            for (target, count) in occurrences {
                let slot = referenced_by[target.index()].entry(referrer).or_insert(0);
                *slot = (*slot).max(count);
            }
        }
    }

    let mut memo: Vec<Option<usize>> = vec![None; table.len()];
    (0..table.len())
        .map(|index| resolve(NonTerminalId::from(index), start, &referenced_by, &mut memo))
        .collect()
}

fn resolve(
    id: NonTerminalId,
    start: NonTerminalId,
    referenced_by: &[BTreeMap<NonTerminalId, usize>],
    memo: &mut [Option<usize>],
) -> usize {
    if let Some(count) = memo[id.index()] {
        return count;
    }

    let referrers = &referenced_by[id.index()];
    let count = if id == start || referrers.is_empty() {
        1
    } else {
        let direct: usize = referrers.values().sum();
        let widest = referrers
            .keys()
            .map(|&referrer| resolve(referrer, start, referenced_by, memo))
            .max()
            .unwrap_or(1);
        direct.saturating_mul(widest)
    };

    memo[id.index()] = Some(count);
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::grammar::loader::parse_grammar;
    use crate::engines::grammar::recursion::eliminate_direct_recursion;

    fn counts(source: &str, max_level: usize) -> (RuleTable, Vec<usize>) {
        let (mut table, start) = parse_grammar(source).unwrap();
        eliminate_direct_recursion(&mut table, max_level).unwrap();
        let counts = count_references(&table, start);
        (table, counts)
    }

    fn count_of(table: &RuleTable, counts: &[usize], name: &str) -> usize {
        counts[table.index[name].index()]
    }

    #[test]
    fn test_flat_grammar_counts() {
        let (table, counts) = counts("<start> ::= <a><b><a>\n<a> ::= x | y\n<b> ::= 1 | 2\n", 3);
        assert_eq!(count_of(&table, &counts, "<start>"), 1);
        assert_eq!(count_of(&table, &counts, "<a>"), 2);
        assert_eq!(count_of(&table, &counts, "<b>"), 1);
    }

    #[test]
    fn test_max_over_alternatives_of_one_rule() {
        let (table, counts) = counts("<start> ::= <a> | <a><a><a> | <a><a>\n<a> ::= x\n", 3);
        assert_eq!(count_of(&table, &counts, "<a>"), 3);
    }

    #[test]
    fn test_sum_over_referencing_rules() {
        // <c> is reached through both <a> and <b> in the same derivation
        let (table, counts) = counts(
            "<start> ::= <a><b>\n<a> ::= <c>\n<b> ::= <c>\n<c> ::= 0 | 1\n",
            3,
        );
        assert_eq!(count_of(&table, &counts, "<c>"), 2);
    }

    #[test]
    fn test_nested_multiplicity() {
        let (table, counts) = counts(
            "<start> ::= <pair><pair>\n<pair> ::= (<v>,<v>)\n<v> ::= 0 | 1\n",
            3,
        );
        assert_eq!(count_of(&table, &counts, "<pair>"), 2);
        assert_eq!(count_of(&table, &counts, "<v>"), 4);
    }

    #[test]
    fn test_recursive_chain_counts_grow_with_depth() {
        let (table, counts) = counts("<start> ::= <e>\n<e> ::= <e>+<e> | n\n", 1);
        assert_eq!(count_of(&table, &counts, "<e>"), 1);
        assert_eq!(count_of(&table, &counts, "<e_lvl_0>"), 2);
        assert_eq!(count_of(&table, &counts, "<e_lvl_1>"), 4);
    }

    #[test]
    fn test_unreferenced_non_terminal_counts_one() {
        let (table, counts) = counts("<start> ::= a\n<orphan> ::= b | c\n", 3);
        assert_eq!(count_of(&table, &counts, "<orphan>"), 1);
    }
}
