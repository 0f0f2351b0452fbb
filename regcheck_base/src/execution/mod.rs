pub mod batch;
pub mod evaluator;

pub use batch::BatchEvaluator;
pub use evaluator::{values_match, RuleEvaluator};
