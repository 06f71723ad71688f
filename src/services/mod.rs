pub mod breakdown_service;
pub mod config_service;
pub mod cumulative_aggregator;
pub mod date_normalizer;
pub mod progress_service;
pub mod recovery_projector;
pub mod schedule_deriver;
pub mod timeline_builder;
pub mod weight_model;
