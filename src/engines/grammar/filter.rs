//! Post-processing of mapped phenotypes.
//!
//! BNF cannot express indentation, so grammars for indentation-sensitive
//! targets use `{:` and `:}` to open and close a block and a literal `\n`
//! to break a line. Comparison operators clash with the `<...>`
//! non-terminal syntax and are written as escapes.

const ESCAPES: [(&str, &str); 5] = [
    ("\\le", "<="),
    ("\\ge", ">="),
    ("\\l", "<"),
    ("\\g", ">"),
    ("\\eb", "|"),
];

const BLOCK_OPEN: &str = "{:";
const BLOCK_CLOSE: &str = ":}";
const LINE_BREAK: &str = "\\n";
const INDENT: &str = "  ";

/// Substitute escapes, turn block markers into indented line breaks and
/// drop blank lines.
pub fn apply(text: &str) -> String {
    let mut unescaped = text.to_string();
    for (escape, replacement) in ESCAPES {
        unescaped = unescaped.replace(escape, replacement);
    }

    let mut indented = String::with_capacity(unescaped.len());
    let mut level: usize = 0;
    let mut rest = unescaped.as_str();

    while let Some(c) = rest.chars().next() {
        let marker = [BLOCK_OPEN, BLOCK_CLOSE, LINE_BREAK]
            .into_iter()
            .find(|m| rest.starts_with(m));

        match marker {
            Some(m) => {
                if m == BLOCK_OPEN {
                    level += 1;
                } else if m == BLOCK_CLOSE {
                    level = level.saturating_sub(1);
                }
                indented.push('\n');
                indented.push_str(&INDENT.repeat(level));
                rest = &rest[m.len()..];
            }
            None => {
                indented.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    indented
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(apply("x+1.0"), "x+1.0");
        assert_eq!(apply(""), "");
    }

    #[test]
    fn test_comparison_escapes() {
        assert_eq!(apply("a \\le b"), "a <= b");
        assert_eq!(apply("a \\ge b"), "a >= b");
        assert_eq!(apply("a \\l b \\g c"), "a < b > c");
        assert_eq!(apply("a \\eb b"), "a | b");
    }

    #[test]
    fn test_blocks_indent_and_dedent() {
        let text = "if x:{:y = 1\\nz = 2:}w = 3";
        assert_eq!(apply(text), "if x:\n  y = 1\n  z = 2\nw = 3");
    }

    #[test]
    fn test_nested_blocks() {
        let text = "for i:{:if i:{:pass:}:}done";
        assert_eq!(apply(text), "for i:\n  if i:\n    pass\ndone");
    }

    #[test]
    fn test_blank_lines_removed() {
        assert_eq!(apply("a\n\n   \nb"), "a\nb");
    }

    #[test]
    fn test_unbalanced_close_does_not_underflow() {
        assert_eq!(apply(":}a"), "a");
    }
}
