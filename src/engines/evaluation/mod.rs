pub mod evaluator;
pub mod expression;
pub mod string_match;
pub mod symbolic_regression;

pub use evaluator::{Evaluation, EvaluationInfo, Evaluator};
pub use expression::Expression;
pub use string_match::StringMatch;
pub use symbolic_regression::SymbolicRegression;
