//! Command-line interface orchestration for arbor.
//!
//! Three commands read weighted trees from JSON: `distance` compares two
//! trees, `matrix` prints the pairwise measure table of a collection and
//! `classify` clusters a collection into classes.

mod commands;
mod input;

pub use commands::{
    ClassificationReport, ClassifyCommand, Cli, CliError, Command, ComparisonArgs,
    DistanceCommand, DistanceReport, MatrixCommand, MatrixReport, Report, render_report, run_cli,
};
pub use input::{TreeDocument, load_forest, load_tree};

#[cfg(test)]
mod test_helpers;
