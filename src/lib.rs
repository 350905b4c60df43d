//! Look up, filter, group and compare AI models from the models.dev catalog.

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod observability;
pub mod query;
pub mod report;
pub mod search;
pub mod series;

#[cfg(test)]
mod tests;
