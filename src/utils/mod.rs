//! Utility functions shared by the loaders and the command line

pub mod logging;

pub use logging::{create_year_progress_bar, finish_progress_bar};
