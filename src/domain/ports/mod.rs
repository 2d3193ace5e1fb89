pub mod metric_provider;
pub mod strategy_repository;
