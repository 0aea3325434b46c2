// Expression Engine Module
// Generator expression parsing, evaluation and cycle detection: $<...>

pub mod compiled;
pub mod dag;
pub mod engine;
pub mod evaluator;
pub mod features;
pub mod functions;
pub mod interpreter;
pub mod lexer;
pub mod operators;
pub mod parser;

pub use compiled::CompiledExpression;
pub use dag::DagChecker;
pub use engine::{GeneratorExpression, PreprocessMode};
pub use evaluator::{EvaluationEffects, Evaluator, ExpressionContext, Scope};
pub use functions::BuiltinFunctions;
pub use interpreter::ExpressionInterpreter;
pub use lexer::{tokenize, Lexer, Token};
pub use operators::{Arity, Operator, Tracking};
pub use parser::{Expr, ExprParser};
