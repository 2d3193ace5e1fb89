pub mod authoring;
pub mod evaluator;
pub mod pool_runner;
pub mod run_pool;
