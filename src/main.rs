use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use scriptorium_artifact::FsStore;
use scriptorium_graph::TaskGraph;
use scriptorium_pipeline::{PipelineExecutor, RunResult, RunStatus};
use scriptorium_task::{PipelineDef, RunInputs};
use scriptorium_worker::{ChatInvoker, Invoker, ScriptedInvoker};

/// Scriptorium - a task-dependency pipeline engine for generative content crews
#[derive(Parser)]
#[command(name = "scriptorium")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.scriptorium)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a pipeline end to end and assemble the final report
  Run {
    /// Path to the pipeline file (JSON)
    pipeline_file: PathBuf,

    /// Path to a JSON file with run inputs (default: read from stdin)
    #[arg(long)]
    inputs: Option<PathBuf>,

    /// Artifact namespace to run under (default: a fresh run id)
    #[arg(long)]
    namespace: Option<String>,
  },

  /// Run a pipeline for several iterations, appending run summaries to a file
  Train {
    /// Path to the pipeline file (JSON)
    pipeline_file: PathBuf,

    /// Number of iterations
    #[arg(short = 'n', long)]
    iterations: u32,

    /// Destination file for per-iteration run summaries (JSON lines)
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Path to a JSON file with run inputs (default: read from stdin)
    #[arg(long)]
    inputs: Option<PathBuf>,
  },

  /// Re-run a pipeline from a specific task, reusing earlier artifacts
  Replay {
    /// Path to the pipeline file (JSON)
    pipeline_file: PathBuf,

    /// Task id to restart from
    #[arg(long = "from")]
    from_task: String,

    /// Artifact namespace of the run being replayed
    #[arg(long)]
    namespace: String,

    /// Path to a JSON file with run inputs (default: read from stdin)
    #[arg(long)]
    inputs: Option<PathBuf>,
  },

  /// Run a pipeline for several iterations with one model for every worker
  Test {
    /// Path to the pipeline file (JSON)
    pipeline_file: PathBuf,

    /// Number of iterations
    #[arg(short = 'n', long)]
    iterations: u32,

    /// Model name to override every worker with
    #[arg(long)]
    model: String,

    /// Path to a JSON file with run inputs (default: read from stdin)
    #[arg(long)]
    inputs: Option<PathBuf>,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = cli.data_dir.unwrap_or_else(|| {
    dirs::home_dir()
      .expect("could not determine home directory")
      .join(".scriptorium")
  });

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    match cli.command {
      Commands::Run {
        pipeline_file,
        inputs,
        namespace,
      } => run(pipeline_file, inputs, namespace, data_dir).await,
      Commands::Train {
        pipeline_file,
        iterations,
        output,
        inputs,
      } => train(pipeline_file, iterations, output, inputs, data_dir).await,
      Commands::Replay {
        pipeline_file,
        from_task,
        namespace,
        inputs,
      } => replay(pipeline_file, from_task, namespace, inputs, data_dir).await,
      Commands::Test {
        pipeline_file,
        iterations,
        model,
        inputs,
      } => test(pipeline_file, iterations, model, inputs, data_dir).await,
    }
  })
}

async fn run(
  pipeline_file: PathBuf,
  inputs_file: Option<PathBuf>,
  namespace: Option<String>,
  data_dir: PathBuf,
) -> Result<()> {
  let def = load_pipeline(&pipeline_file).await?;
  let inputs = load_inputs(inputs_file).await?;
  let graph = TaskGraph::build(def.tasks.clone()).context("invalid task graph")?;
  let invoker = build_invoker(&def)?;

  let namespace = namespace.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
  let working_dir = data_dir.join(&def.name).join(&namespace);
  let store = FsStore::new(&working_dir);

  eprintln!("Running pipeline '{}' ({} tasks)", def.name, graph.len());
  eprintln!("Artifacts: {}", working_dir.display());

  let executor = PipelineExecutor::new(invoker.as_ref(), &store);
  let result = executor
    .run(&graph, &def.workers, &inputs, CancellationToken::new())
    .await
    .context("pipeline execution failed")?;

  print_summary(&result);
  if result.status != RunStatus::Succeeded {
    bail!("run {} did not succeed", result.run_id);
  }

  let mut report = def.report.clone();
  for (key, value) in &mut report.metadata {
    *value = scriptorium_pipeline::render(value, &inputs)
      .with_context(|| format!("failed to render report metadata '{key}'"))?;
  }
  report
    .metadata
    .insert(0, ("Generated".to_string(), chrono::Utc::now().to_rfc3339()));

  let document = scriptorium_report::assemble(&report, &store)
    .await
    .context("report assembly failed")?;

  let report_path = working_dir.join("report.md");
  tokio::fs::write(&report_path, &document)
    .await
    .with_context(|| format!("failed to write report to {}", report_path.display()))?;

  eprintln!("Report saved to: {}", report_path.display());
  Ok(())
}

async fn train(
  pipeline_file: PathBuf,
  iterations: u32,
  output: PathBuf,
  inputs_file: Option<PathBuf>,
  data_dir: PathBuf,
) -> Result<()> {
  let def = load_pipeline(&pipeline_file).await?;
  let inputs = load_inputs(inputs_file).await?;
  let graph = TaskGraph::build(def.tasks.clone()).context("invalid task graph")?;
  let invoker = build_invoker(&def)?;

  use tokio::io::AsyncWriteExt;

  // Summaries append as each iteration completes, so earlier iterations
  // survive a later failure and repeated runs accumulate in one file.
  let mut summary_file = tokio::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(&output)
    .await
    .with_context(|| format!("failed to open summary file: {}", output.display()))?;

  for i in 0..iterations {
    let namespace = format!("train-{}-{i}", uuid::Uuid::new_v4());
    let store = FsStore::new(data_dir.join(&def.name).join(&namespace));

    eprintln!("Iteration {} of {iterations}", i + 1);
    let result = PipelineExecutor::new(invoker.as_ref(), &store)
      .run(&graph, &def.workers, &inputs, CancellationToken::new())
      .await
      .context("pipeline execution failed")?;

    print_summary(&result);
    let line = serde_json::to_string(&result)? + "\n";
    summary_file
      .write_all(line.as_bytes())
      .await
      .with_context(|| format!("failed to append summary to {}", output.display()))?;
  }

  eprintln!("Appended {iterations} run summaries to {}", output.display());
  Ok(())
}

async fn replay(
  pipeline_file: PathBuf,
  from_task: String,
  namespace: String,
  inputs_file: Option<PathBuf>,
  data_dir: PathBuf,
) -> Result<()> {
  let def = load_pipeline(&pipeline_file).await?;
  let inputs = load_inputs(inputs_file).await?;
  let graph = TaskGraph::build(def.tasks.clone()).context("invalid task graph")?;
  let invoker = build_invoker(&def)?;

  let working_dir = data_dir.join(&def.name).join(&namespace);
  let store = FsStore::new(&working_dir);

  eprintln!("Replaying pipeline '{}' from task '{from_task}'", def.name);
  eprintln!("Artifacts: {}", working_dir.display());

  let result = PipelineExecutor::new(invoker.as_ref(), &store)
    .run_from(
      &graph,
      &def.workers,
      &inputs,
      Some(&from_task),
      CancellationToken::new(),
    )
    .await
    .context("pipeline replay failed")?;

  print_summary(&result);
  if result.status != RunStatus::Succeeded {
    bail!("replay {} did not succeed", result.run_id);
  }
  Ok(())
}

async fn test(
  pipeline_file: PathBuf,
  iterations: u32,
  model: String,
  inputs_file: Option<PathBuf>,
  data_dir: PathBuf,
) -> Result<()> {
  let mut def = load_pipeline(&pipeline_file).await?;
  for worker in &mut def.workers {
    worker.capability = worker.capability.with_model(&model);
  }

  let inputs = load_inputs(inputs_file).await?;
  let graph = TaskGraph::build(def.tasks.clone()).context("invalid task graph")?;
  let invoker = build_invoker(&def)?;

  let mut succeeded = 0;
  for i in 0..iterations {
    let namespace = format!("test-{}-{i}", uuid::Uuid::new_v4());
    let store = FsStore::new(data_dir.join(&def.name).join(&namespace));

    eprintln!("Test iteration {} of {iterations} (model: {model})", i + 1);
    let result = PipelineExecutor::new(invoker.as_ref(), &store)
      .run(&graph, &def.workers, &inputs, CancellationToken::new())
      .await
      .context("pipeline execution failed")?;

    print_summary(&result);
    if result.status == RunStatus::Succeeded {
      succeeded += 1;
    }
  }

  eprintln!("{succeeded}/{iterations} iterations succeeded");
  if succeeded != iterations {
    bail!("{} test iterations failed", iterations - succeeded);
  }
  Ok(())
}

async fn load_pipeline(path: &Path) -> Result<PipelineDef> {
  let content = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read pipeline file: {}", path.display()))?;

  let def: PipelineDef = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse pipeline file: {}", path.display()))?;

  def.validate().context("invalid pipeline declaration")?;
  Ok(def)
}

/// Read run inputs from the given file, or from stdin when none is given.
async fn load_inputs(path: Option<PathBuf>) -> Result<RunInputs> {
  let content = match path {
    Some(path) => tokio::fs::read_to_string(&path)
      .await
      .with_context(|| format!("failed to read inputs file: {}", path.display()))?,
    None => {
      use std::io::Read;
      let mut buf = String::new();
      std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read inputs from stdin")?;
      buf
    }
  };

  if content.trim().is_empty() {
    return Ok(RunInputs::new());
  }
  serde_json::from_str(&content).context("inputs must be a JSON object of named values")
}

/// Pick the invoker for a pipeline's workers.
///
/// Pipelines whose workers are all scripted run offline; anything else goes
/// through the chat backend and needs OPENAI_API_KEY.
fn build_invoker(def: &PipelineDef) -> Result<Box<dyn Invoker>> {
  let all_scripted = def
    .workers
    .iter()
    .all(|w| matches!(w.capability, scriptorium_task::CapabilityConfig::Scripted));

  if all_scripted {
    return Ok(Box::new(ScriptedInvoker::new()));
  }

  let api_key =
    std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is required for chat workers")?;
  Ok(Box::new(ChatInvoker::new(api_key)))
}

fn print_summary(result: &RunResult) {
  eprintln!("Run {}: {:?}", result.run_id, result.status);
  for task in &result.task_results {
    eprintln!("  {:<24} {:?}", task.task_id, task.status);
  }
  if let Some(failed) = &result.first_failed_task_id {
    eprintln!("First failed task: {failed}");
  }
}
