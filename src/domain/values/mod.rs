pub mod branch;
pub mod edge;
pub mod margin;
pub mod metric;
pub mod range;
pub mod step_id;
