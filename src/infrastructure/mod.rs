pub mod samples;
pub mod sqlite;
