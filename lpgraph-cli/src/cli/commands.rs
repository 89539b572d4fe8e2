//! Command implementations and argument parsing for the `lpgraph` binary.

use std::{
    io::{self, Write},
    path::PathBuf,
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use lpgraph_core::{
    DEFAULT_EXTENSION, DEFAULT_MAX_HOPS, DuplicatePolicy, MethodFamily, MethodRegistry,
    PipelineBuilder, PipelineError, PipelineErrorCode, PipelineReport, RegistryError,
};
use lpgraph_predictors::{registry_with_groups, standard_registry};
use lpgraph_providers_edgelist::{EdgeListError, EdgeListSource};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "lpgraph",
    about = "Rank link-prediction candidates and reconstruct the graph at ten coverage levels."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Score every selected method and write its ten reconstructions.
    Run(RunCommand),
    /// List the registered methods with their parameters.
    Methods(MethodsCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Weighted edge-list file, one `source target weight` record per line.
    pub input: PathBuf,

    /// Directory receiving the reconstructed edge lists.
    #[arg(long, short)]
    pub output: PathBuf,

    /// Group membership file; enables the group-overlap methods.
    #[arg(long)]
    pub groups: Option<PathBuf>,

    /// Method to run; repeat to select several. Defaults to every method.
    #[arg(long = "method", value_name = "NAME")]
    pub methods: Vec<String>,

    /// Treatment of candidates that repeat a training edge.
    #[arg(long, value_enum, default_value_t = DuplicateMode::Keep)]
    pub duplicates: DuplicateMode,

    /// Longest path, in edges, joining a candidate pair.
    #[arg(
        long = "max-hops",
        default_value_t = DEFAULT_MAX_HOPS,
        value_parser = clap::value_parser!(usize),
    )]
    pub max_hops: usize,

    /// Extension of the written artifacts.
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Override name for the graph (defaults to the input file stem).
    #[arg(long)]
    pub name: Option<String>,
}

/// Options accepted by the `methods` command.
#[derive(Debug, Args, Clone, Copy)]
pub struct MethodsCommand {
    /// Include the group-overlap methods.
    #[arg(long)]
    pub groups: bool,
}

/// Command-line spelling of [`DuplicatePolicy`].
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum DuplicateMode {
    /// Append the candidate prefix as ranked, repeats included.
    #[default]
    Keep,
    /// Drop candidates whose pair is already a training edge.
    Drop,
}

impl From<DuplicateMode> for DuplicatePolicy {
    fn from(mode: DuplicateMode) -> Self {
        match mode {
            DuplicateMode::Keep => Self::Keep,
            DuplicateMode::Drop => Self::DropTrainingDuplicates,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The built-in registry could not be assembled.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The pipeline rejected its configuration or could not load the graph.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl CliError {
    /// Returns the pipeline error code, if the failure came from the pipeline.
    #[must_use]
    pub fn pipeline_code(&self) -> Option<PipelineErrorCode> {
        match self {
            Self::Pipeline(error) => Some(error.code()),
            Self::Registry(_) => None,
        }
    }

    /// Returns the edge-list error code when the graph failed to load.
    #[must_use]
    pub fn source_code(&self) -> Option<&'static str> {
        match self {
            Self::Pipeline(PipelineError::GraphLoad { error, .. }) => error
                .downcast_ref::<EdgeListError>()
                .map(EdgeListError::code),
            _ => None,
        }
    }
}

/// One row of the `methods` listing.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRow {
    /// Registry name.
    pub name: String,
    /// Method family.
    pub family: MethodFamily,
    /// Rendered construction parameters.
    pub params: String,
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub enum ExecutionSummary {
    /// Outcome of `run`.
    Run(PipelineReport),
    /// Outcome of `methods`.
    Methods(Vec<MethodRow>),
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when the configuration is invalid or the input graph
/// cannot be loaded. Per-method failures are reported in the summary instead.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use lpgraph_cli::cli::{Cli, Command, DuplicateMode, ExecutionSummary, RunCommand, run_cli};
/// # use tempfile::TempDir;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = TempDir::new()?;
/// let input = dir.path().join("net.txt");
/// std::fs::write(&input, "A B 1\nB C 1\n")?;
/// let cli = Cli {
///     command: Command::Run(RunCommand {
///         input,
///         output: dir.path().join("out"),
///         groups: None,
///         methods: vec!["CommonNeighbors".into()],
///         duplicates: DuplicateMode::Keep,
///         max_hops: 2,
///         extension: "lpg".into(),
///         name: None,
///     }),
/// };
/// let ExecutionSummary::Run(report) = run_cli(cli)? else { unreachable!() };
/// assert_eq!(report.artifacts_written(), 10);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run).map(ExecutionSummary::Run)
        }
        Command::Methods(methods) => {
            Span::current().record("command", field::display("methods"));
            list_methods(methods).map(ExecutionSummary::Methods)
        }
    }
}

fn registry_for(with_groups: bool) -> Result<MethodRegistry, RegistryError> {
    if with_groups {
        registry_with_groups()
    } else {
        standard_registry()
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(input = %command.input.display(), output = %command.output.display(), groups = field::Empty),
)]
pub(super) fn run_command(command: RunCommand) -> Result<PipelineReport, CliError> {
    let RunCommand {
        input,
        output,
        groups,
        methods,
        duplicates,
        max_hops,
        extension,
        name,
    } = command;

    let registry = registry_for(groups.is_some())?;
    let pipeline = PipelineBuilder::new()
        .with_registry(registry)
        .with_output_dir(output)
        .with_extension(extension)
        .with_max_hops(max_hops)
        .with_duplicate_policy(duplicates.into())
        .with_methods(methods)
        .build()?;

    let mut source = EdgeListSource::new(input);
    if let Some(name) = name {
        source = source.with_name(name);
    }
    if let Some(path) = groups {
        Span::current().record("groups", field::display(path.display()));
        source = source.with_groups(path);
    }

    let report = pipeline.run(&source)?;
    info!(
        graph = report.graph(),
        artifacts = report.artifacts_written(),
        skipped = report.skipped_methods(),
        "command completed"
    );
    Ok(report)
}

pub(super) fn list_methods(command: MethodsCommand) -> Result<Vec<MethodRow>, CliError> {
    let registry = registry_for(command.groups)?;
    Ok(registry
        .descriptors()
        .iter()
        .map(|descriptor| MethodRow {
            name: descriptor.name().to_owned(),
            family: descriptor.family(),
            params: descriptor.params().to_string(),
        })
        .collect())
}

/// Renders `summary` to `writer` as tab-separated text.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use lpgraph_cli::cli::{ExecutionSummary, MethodRow, render_summary};
/// # use lpgraph_core::MethodFamily;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary::Methods(vec![MethodRow {
///     name: "Katz".into(),
///     family: MethodFamily::Global,
///     params: "path_length=5 beta=0.05".into(),
/// }]);
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert_eq!(String::from_utf8(buffer)?, "Katz\tglobal\tpath_length=5 beta=0.05\n");
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Methods(rows) => {
            for row in rows {
                writeln!(writer, "{}\t{}\t{}", row.name, row.family, row.params)?;
            }
        }
        ExecutionSummary::Run(report) => {
            writeln!(
                writer,
                "graph: {} ({} nodes, {} training edges)",
                report.graph(),
                report.node_count(),
                report.training_edges()
            )?;
            for method in report.methods() {
                writeln!(
                    writer,
                    "{}\t{}\t{} candidates\t{} artifacts",
                    method.method(),
                    method.outcome().label(),
                    method.candidates(),
                    method.artifacts().len()
                )?;
            }
            writeln!(writer, "artifacts written: {}", report.artifacts_written())?;
            if report.artifact_failures() > 0 {
                writeln!(writer, "artifacts failed: {}", report.artifact_failures())?;
            }
            writeln!(writer, "methods skipped: {}", report.skipped_methods())?;
            writeln!(writer, "finished")?;
        }
    }
    Ok(())
}
