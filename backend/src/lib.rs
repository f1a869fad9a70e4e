pub mod app;
pub mod cli;
pub mod config;
pub mod dry_run;
pub mod format;
pub mod jobs;
pub mod mboum;
pub mod startup;
pub mod telegram;
