pub mod migrations;
pub mod strategy_repo;
