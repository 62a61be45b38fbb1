//! Command implementations and argument parsing for the arbor CLI.

use std::io::{self, Write};
use std::path::PathBuf;

use arbor_core::{
    ArborError, ClassifierBuilder, Criterion, DistanceMatrix, ExecutionStrategy, Linkage,
    LocalCost, SimilarityMeasure, TreeDistanceError, TreeEditDistance,
};
use clap::{ArgGroup, Args, Parser, Subcommand};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

use super::input::{TreeDocument, collection_label, load_forest, load_tree};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "arbor", about = "Compare and classify weighted unordered trees.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Compare two trees and print the optimal node mapping.
    Distance(DistanceCommand),
    /// Print the pairwise distance matrix of a tree collection.
    Matrix(MatrixCommand),
    /// Cluster a tree collection into classes.
    Classify(ClassifyCommand),
}

/// Options shared by every command that compares trees.
#[derive(Debug, Args, Clone)]
pub struct ComparisonArgs {
    /// Similarity measure: `absolute`, `average` or `normalized`.
    #[arg(long, default_value = "normalized")]
    pub measure: SimilarityMeasure,

    /// Local cost: `absolute` or `normalized`.
    #[arg(long, default_value = "absolute")]
    pub cost: LocalCost,
}

/// Options accepted by the `distance` command.
#[derive(Debug, Args, Clone)]
pub struct DistanceCommand {
    /// JSON file holding the first tree.
    pub left: PathBuf,

    /// JSON file holding the second tree.
    pub right: PathBuf,

    /// Measure and cost selection.
    #[command(flatten)]
    pub comparison: ComparisonArgs,
}

/// Options accepted by the `matrix` command.
#[derive(Debug, Args, Clone)]
pub struct MatrixCommand {
    /// JSON file holding an array of trees.
    pub path: PathBuf,

    /// Measure and cost selection.
    #[command(flatten)]
    pub comparison: ComparisonArgs,

    /// Compare pairs on the calling thread only.
    #[arg(long)]
    pub serial: bool,
}

/// Options accepted by the `classify` command.
#[derive(Debug, Args, Clone)]
#[command(group(ArgGroup::new("criterion").required(true).args(["classes", "threshold"])))]
pub struct ClassifyCommand {
    /// JSON file holding an array of trees.
    pub path: PathBuf,

    /// Measure and cost selection.
    #[command(flatten)]
    pub comparison: ComparisonArgs,

    /// Number of classes to produce.
    #[arg(long)]
    pub classes: Option<usize>,

    /// Cut every merge at or above this distance.
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Cluster linkage: `single`, `complete` or `average`.
    #[arg(long, default_value = "average")]
    pub linkage: Linkage,

    /// Compare pairs on the calling thread only.
    #[arg(long)]
    pub serial: bool,
}

impl ClassifyCommand {
    fn criterion(&self) -> Criterion {
        match (self.classes, self.threshold) {
            (_, Some(threshold)) => Criterion::Threshold(threshold),
            (Some(count), None) => Criterion::ClassCount(count),
            (None, None) => Criterion::ClassCount(0),
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while loading an input file.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// An input file was not a valid tree document.
    #[error("failed to parse `{path}`: {source}")]
    Json {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// Comparing two trees failed.
    #[error(transparent)]
    Distance(#[from] TreeDistanceError),
    /// Core orchestration failed.
    #[error(transparent)]
    Core(#[from] ArborError),
}

impl CliError {
    /// Stable code of the underlying library error, if any.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Distance(error) => Some(error.code().as_str()),
            Self::Core(error) => Some(error.code().as_str()),
            Self::Io { .. } | Self::Json { .. } => None,
        }
    }

    /// Code of the lower-layer error wrapped by a core error, if any.
    #[must_use]
    pub fn source_code(&self) -> Option<&'static str> {
        match self {
            Self::Core(error) => error.source_code(),
            Self::Io { .. } | Self::Json { .. } | Self::Distance(_) => None,
        }
    }
}

/// Outcome of the `distance` command.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceReport {
    /// Measure the value was computed with.
    pub measure: SimilarityMeasure,
    /// Measure value between the two trees.
    pub value: f64,
    /// Raw edit distance behind `value`.
    pub distance: f64,
    /// Mapped node labels in pre-order of the first tree.
    pub mapping: Vec<(String, String)>,
}

/// Outcome of the `matrix` command.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixReport {
    /// Row and column labels.
    pub labels: Vec<String>,
    /// Pairwise measure values.
    pub matrix: DistanceMatrix,
}

/// Outcome of the `classify` command.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    /// Member labels of every class.
    pub classes: Vec<Vec<String>>,
    /// Distance the dendrogram was cut at.
    pub cutoff: f64,
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Result of `distance`.
    Distance(DistanceReport),
    /// Result of `matrix`.
    Matrix(MatrixReport),
    /// Result of `classify`.
    Classification(ClassificationReport),
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading the input or executing the command
/// fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use arbor_cli::cli::{Cli, Command, ComparisonArgs, DistanceCommand, Report, run_cli};
/// # use arbor_core::{LocalCost, SimilarityMeasure};
/// # use tempfile::TempDir;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = TempDir::new()?;
/// let left = dir.path().join("left.json");
/// let right = dir.path().join("right.json");
/// std::fs::write(&left, r#"{"attribute": 10}"#)?;
/// std::fs::write(&right, r#"{"attribute": 25}"#)?;
/// let cli = Cli {
///     command: Command::Distance(DistanceCommand {
///         left,
///         right,
///         comparison: ComparisonArgs {
///             measure: SimilarityMeasure::AbsoluteDifference,
///             cost: LocalCost::Absolute,
///         },
///     }),
/// };
/// let Report::Distance(report) = run_cli(cli)? else { unreachable!() };
/// assert_eq!(report.value, 15.0);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<Report, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Distance(command) => {
            span.record("command", field::display("distance"));
            run_distance(command).map(Report::Distance)
        }
        Command::Matrix(command) => {
            span.record("command", field::display("matrix"));
            run_matrix(command).map(Report::Matrix)
        }
        Command::Classify(command) => {
            span.record("command", field::display("classify"));
            run_classify(command).map(Report::Classification)
        }
    }
}

fn strategy(serial: bool) -> ExecutionStrategy {
    if serial {
        ExecutionStrategy::Serial
    } else {
        ExecutionStrategy::Auto
    }
}

#[instrument(
    name = "cli.distance",
    err,
    skip(command),
    fields(measure = %command.comparison.measure, cost = %command.comparison.cost),
)]
pub(super) fn run_distance(command: DistanceCommand) -> Result<DistanceReport, CliError> {
    let left = load_tree(&command.left)?;
    let right = load_tree(&command.right)?;
    let ComparisonArgs { measure, cost } = command.comparison;

    let solved = TreeEditDistance::compute(Some(&left), Some(&right), &cost)?;
    let value = measure.apply(&solved);
    let mapping = solved
        .mapping()
        .iter()
        .map(|(from, to): (&TreeDocument, &TreeDocument)| (from.label(), to.label()))
        .collect();

    info!(value, distance = solved.distance(), "distance computed");
    Ok(DistanceReport {
        measure,
        value,
        distance: solved.distance(),
        mapping,
    })
}

#[instrument(
    name = "cli.matrix",
    err,
    skip(command),
    fields(measure = %command.comparison.measure, serial = command.serial),
)]
pub(super) fn run_matrix(command: MatrixCommand) -> Result<MatrixReport, CliError> {
    let trees = load_forest(&command.path)?;
    if trees.is_empty() {
        return Err(ArborError::EmptyInput.into());
    }
    let classifier = ClassifierBuilder::new()
        .with_measure(command.comparison.measure)
        .with_local_cost(command.comparison.cost)
        .with_execution_strategy(strategy(command.serial))
        .build()?;

    let matrix = classifier.distance_matrix(&trees)?;
    let labels = trees
        .iter()
        .enumerate()
        .map(|(index, tree)| collection_label(tree, index))
        .collect();
    Ok(MatrixReport { labels, matrix })
}

#[instrument(
    name = "cli.classify",
    err,
    skip(command),
    fields(criterion = field::Empty, linkage = %command.linkage),
)]
pub(super) fn run_classify(command: ClassifyCommand) -> Result<ClassificationReport, CliError> {
    let criterion = command.criterion();
    Span::current().record("criterion", field::display(criterion));

    let trees = load_forest(&command.path)?;
    let classifier = ClassifierBuilder::new()
        .with_measure(command.comparison.measure)
        .with_local_cost(command.comparison.cost)
        .with_linkage(command.linkage)
        .with_criterion(criterion)
        .with_execution_strategy(strategy(command.serial))
        .build()?;

    let classification = classifier.run(&trees)?;
    let classes = classification
        .class_indices()
        .iter()
        .map(|class| {
            class
                .iter()
                .map(|&index| collection_label(&trees[index], index))
                .collect()
        })
        .collect();
    Ok(ClassificationReport {
        classes,
        cutoff: classification.cutoff(),
    })
}

/// Renders `report` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use arbor_cli::cli::{ClassificationReport, Report, render_report};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let report = Report::Classification(ClassificationReport {
///     classes: vec![vec!["a".into(), "b".into()], vec!["c".into()]],
///     cutoff: 2.5,
/// });
/// let mut buffer = Vec::new();
/// render_report(&report, &mut buffer)?;
/// assert_eq!(String::from_utf8(buffer)?, "classes: 2\ncutoff: 2.5\n0\ta, b\n1\tc\n");
/// # Ok(())
/// # }
/// ```
pub fn render_report(report: &Report, mut writer: impl Write) -> io::Result<()> {
    match report {
        Report::Distance(distance) => {
            writeln!(writer, "measure: {}", distance.measure)?;
            writeln!(writer, "value: {}", distance.value)?;
            writeln!(writer, "distance: {}", distance.distance)?;
            writeln!(writer, "mapping:")?;
            for (left, right) in &distance.mapping {
                writeln!(writer, "  {left} -> {right}")?;
            }
        }
        Report::Matrix(matrix) => {
            writeln!(writer, "\t{}", matrix.labels.join("\t"))?;
            for (label, row) in matrix.labels.iter().zip(matrix.matrix.rows()) {
                let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
                writeln!(writer, "{label}\t{}", cells.join("\t"))?;
            }
        }
        Report::Classification(classification) => {
            writeln!(writer, "classes: {}", classification.classes.len())?;
            writeln!(writer, "cutoff: {}", classification.cutoff)?;
            for (index, members) in classification.classes.iter().enumerate() {
                writeln!(writer, "{index}\t{}", members.join(", "))?;
            }
        }
    }
    Ok(())
}
