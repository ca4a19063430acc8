pub mod api;
pub mod app;
pub mod availability;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod output;
pub mod pagination;
pub mod query;
pub mod state;
pub mod ui;

#[cfg(test)]
mod tests;
