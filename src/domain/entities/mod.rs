pub mod recommendation;
pub mod sample;
pub mod slip;
pub mod snapshot;
pub mod strategy;
