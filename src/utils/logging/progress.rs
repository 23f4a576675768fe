//! Progress reporting for multi-year loads, using the indicatif crate.

use indicatif::{ProgressBar, ProgressStyle};

/// Default style for the year progress bar
pub const DEFAULT_YEAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} years {msg}";

/// Create a progress bar counting loaded years
///
/// # Arguments
/// * `years` - Number of years that will be loaded
/// * `description` - Optional description to display as the initial message
#[must_use]
pub fn create_year_progress_bar(years: u64, description: Option<&str>) -> ProgressBar {
    let pb = ProgressBar::new(years);
    let style = ProgressStyle::with_template(DEFAULT_YEAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);

    if let Some(desc) = description {
        pb.set_message(desc.to_string());
    }

    pb
}

/// Finish a progress bar with a completion message
pub fn finish_progress_bar(pb: &ProgressBar, message: Option<&str>) {
    if let Some(msg) = message {
        pb.finish_with_message(msg.to_string());
    } else {
        pb.finish();
    }
}
