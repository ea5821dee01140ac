pub mod app;
pub mod cli;
pub mod config;
pub mod dates;
pub mod filter;
pub mod logging;
pub mod output;
pub mod pagination;
pub mod records;
pub mod runner;
pub mod source;

#[cfg(test)]
mod tests;
