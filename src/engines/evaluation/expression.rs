use crate::error::{Result, SgeError};

/// Denominators closer to zero than this make division return 1
const PROTECTED_DIVISION_EPSILON: f64 = 1e-6;

/// Parsed arithmetic expression over the variable `x`
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Const(f64),
    Var,
    Neg(Box<Expression>),
    Binary {
        op: Operator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Expression {
    /// Parse infix arithmetic: `+ - * /`, parentheses, unary minus,
    /// numeric literals and `x`. Whitespace is ignored.
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = tokenize(source)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expression = parser.parse_sum()?;
        if parser.pos != parser.tokens.len() {
            return Err(SgeError::Evaluation(format!(
                "unexpected trailing input in {:?}",
                source
            )));
        }
        Ok(expression)
    }

    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Expression::Const(c) => *c,
            Expression::Var => x,
            Expression::Neg(inner) => -inner.eval(x),
            Expression::Binary { op, left, right } => {
                let a = left.eval(x);
                let b = right.eval(x);
                match op {
                    Operator::Add => a + b,
                    Operator::Sub => a - b,
                    Operator::Mul => a * b,
                    Operator::Div => {
                        if b.abs() < PROTECTED_DIVISION_EPSILON {
                            1.0
                        } else {
                            a / b
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Var,
    Op(char),
    Open,
    Close,
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            '+' | '-' | '*' | '/' => tokens.push(Token::Op(c)),
            'x' => tokens.push(Token::Var),
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &source[start..end];
                let value = literal.parse::<f64>().map_err(|e| {
                    SgeError::Evaluation(format!("bad number {:?}: {}", literal, e))
                })?;
                tokens.push(Token::Number(value));
            }
            other => {
                return Err(SgeError::Evaluation(format!(
                    "unexpected character {:?} at {}",
                    other, start
                )))
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_sum(&mut self) -> Result<Expression> {
        let mut left = self.parse_product()?;
        while let Some(Token::Op(c @ ('+' | '-'))) = self.peek() {
            let op = if *c == '+' { Operator::Add } else { Operator::Sub };
            self.pos += 1;
            let right = self.parse_product()?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_product(&mut self) -> Result<Expression> {
        let mut left = self.parse_unary()?;
        while let Some(Token::Op(c @ ('*' | '/'))) = self.peek() {
            let op = if *c == '*' { Operator::Mul } else { Operator::Div };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        if let Some(Token::Op('-')) = self.peek() {
            self.pos += 1;
            return Ok(Expression::Neg(Box::new(self.parse_unary()?)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expression> {
        match self.next() {
            Some(Token::Number(value)) => Ok(Expression::Const(value)),
            Some(Token::Var) => Ok(Expression::Var),
            Some(Token::Open) => {
                let inner = self.parse_sum()?;
                match self.next() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err(SgeError::Evaluation("missing ')'".to_string())),
                }
            }
            other => Err(SgeError::Evaluation(format!("unexpected token {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str, x: f64) -> f64 {
        Expression::parse(source).unwrap().eval(x)
    }

    #[test]
    fn test_precedence_and_parentheses() {
        assert_eq!(eval("1+2*3", 0.0), 7.0);
        assert_eq!(eval("(1+2)*3", 0.0), 9.0);
        assert_eq!(eval("8-4-2", 0.0), 2.0);
        assert_eq!(eval("-x*2", 3.0), -6.0);
    }

    #[test]
    fn test_variable_substitution() {
        assert_eq!(eval("((x*x)+1.0)", 2.0), 5.0);
    }

    #[test]
    fn test_protected_division() {
        assert_eq!(eval("x/(x-x)", 4.0), 1.0);
        assert_eq!(eval("x/2", 4.0), 2.0);
    }

    #[test]
    fn test_malformed_input_rejected() {
        assert!(Expression::parse("(x+1").is_err());
        assert!(Expression::parse("x+").is_err());
        assert!(Expression::parse("x y").is_err());
        assert!(Expression::parse("sin(x)").is_err());
        assert!(Expression::parse("1..2").is_err());
    }
}
