use clap::{Parser, Subcommand};
use exhaustive::combinator::{
    CombinatorInputs, ExhaustivePromptCombinator, PoolInputs, PromptCombinationGenerator,
};
use exhaustive::config::Config;
use exhaustive::editor::Editor;
use exhaustive::graph::HostNode;
use exhaustive::logging;
use exhaustive::queue::{AutoQueueLoopController, IndexMode, LoopInputs};
use exhaustive::signal::{LogSink, SignalSink};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Dynamic pool slots and exhaustive prompt combination tools
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Optional JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every combination of a template and its pools
    Generate {
        /// Template text with [n] anchors
        #[arg(short, long)]
        template: String,
        /// Pool files, one entry per line; the first file is pool 1
        pools: Vec<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load a saved workflow, reconcile its pool slots and print them
    Reconcile {
        /// Workflow JSON file
        workflow: PathBuf,
        /// Write the reconciled workflow here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Produce the next combination of a stateful walk
    Step {
        #[arg(short, long)]
        template: String,
        pools: Vec<PathBuf>,
        /// State file; defaults to the configured combinator state file
        #[arg(short, long)]
        state: Option<PathBuf>,
        /// Index to restart from (0 keeps going)
        #[arg(long, default_value_t = 0)]
        start_index: u64,
        /// Cap on the number of combinations (0 means no cap)
        #[arg(long, default_value_t = 0)]
        max_combinations: u64,
    },
    /// Expand the pools and run one step of the loop controller over the result
    Loop {
        #[arg(short, long)]
        template: String,
        pools: Vec<PathBuf>,
        #[arg(short, long)]
        state: Option<PathBuf>,
        /// Auto, Specified or "From Start"
        #[arg(long, default_value = "Auto")]
        mode: IndexMode,
        #[arg(long, default_value_t = 0)]
        start_index: u64,
        #[arg(long, default_value_t = 100)]
        limit: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => Config::default(),
    };
    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Warning: {}", e);
    }

    let start = Instant::now();
    match cli.command {
        Command::Generate {
            template,
            pools,
            json,
        } => run_generate(&config, &template, &pools, json),
        Command::Reconcile { workflow, output } => run_reconcile(&config, workflow, output),
        Command::Step {
            template,
            pools,
            state,
            start_index,
            max_combinations,
        } => {
            let state = state.unwrap_or_else(|| config.state.combinator_path());
            run_step(&config, template, &pools, state, start_index, max_combinations);
        }
        Command::Loop {
            template,
            pools,
            state,
            mode,
            start_index,
            limit,
        } => {
            let state = state.unwrap_or_else(|| config.state.loop_path());
            let inputs = LoopRun {
                mode,
                start_index,
                limit,
            };
            run_loop(&config, &template, &pools, state, inputs);
        }
    }
    println!("\nFinished in {:?}", start.elapsed());
}

fn run_generate(config: &Config, template: &str, pool_paths: &[PathBuf], json: bool) {
    let pools = read_pools(pool_paths);
    let generator = PromptCombinationGenerator::new(config.reconciler.max_pools);
    let result = generator
        .execute(template, &pools)
        .unwrap_or_else(|e| exit_with_error(&format!("Generation failed: {}", e)));

    if json {
        let payload = serde_json::json!({
            "combo_list": result.combinations,
            "total_count": result.total,
            "config_hash": result.config_hash,
        });
        let text = serde_json::to_string_pretty(&payload)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode result: {}", e)));
        println!("{}", text);
        return;
    }

    for (i, combo) in result.combinations.iter().enumerate() {
        println!("{:>5}: {}", i, combo);
    }
    println!("\nTotal:       {}", result.total);
    println!("Config hash: {}", result.config_hash);
}

fn run_reconcile(config: &Config, workflow_path: PathBuf, output: Option<PathBuf>) {
    let json = fs::read_to_string(&workflow_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read workflow '{}': {}",
            workflow_path.display(),
            e
        ))
    });
    let mut editor = Editor::new(config)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to set up the editor: {}", e)));
    let ids = editor
        .load_graph_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse workflow JSON: {}", e)));
    let reconciled = editor.settle();
    println!("Loaded {} nodes, reconciled {}", ids.len(), reconciled);

    for id in ids {
        let Some(node) = editor.node(id) else {
            continue;
        };
        println!("\n[{}] {}", id, node.node_type());
        for slot in node.inputs() {
            let link = slot.link.map_or_else(|| "-".to_string(), |l| l.to_string());
            println!(
                "  {:>2}  {:<16} {:<8} {}",
                slot.slot_index, slot.name, slot.slot_type, link
            );
        }
    }

    if let Some(path) = output {
        let text = serde_json::to_string_pretty(&editor.workflow())
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode workflow: {}", e)));
        fs::write(&path, text).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to write '{}': {}", path.display(), e))
        });
        println!("\nWrote {}", path.display());
    }
}

fn run_step(
    config: &Config,
    template: String,
    pool_paths: &[PathBuf],
    state: PathBuf,
    start_index: u64,
    max_combinations: u64,
) {
    let max_pools = u32::try_from(config.reconciler.max_pools).unwrap_or(u32::MAX);
    let mut combinator = ExhaustivePromptCombinator::new(state, sink(), max_pools);
    let inputs = CombinatorInputs {
        start_index,
        max_combinations,
        auto_queue: false,
        pools: read_pools(pool_paths),
        ..CombinatorInputs::new(template)
    };
    let output = combinator.execute(&inputs);
    println!("{}\n\n{}", output.prompt, output.log);
}

struct LoopRun {
    mode: IndexMode,
    start_index: u64,
    limit: u64,
}

fn run_loop(
    config: &Config,
    template: &str,
    pool_paths: &[PathBuf],
    state: PathBuf,
    run: LoopRun,
) {
    let generator = PromptCombinationGenerator::new(config.reconciler.max_pools);
    let generated = generator
        .execute(template, &read_pools(pool_paths))
        .unwrap_or_else(|e| exit_with_error(&format!("Generation failed: {}", e)));

    let inputs = LoopInputs {
        total_count: generated.total,
        config_hash: generated.config_hash,
        combo_list: generated.combinations,
        index_mode: run.mode,
        start_index: run.start_index,
        max_iteration_limit: run.limit,
    };
    let mut controller = AutoQueueLoopController::new("cli", state, sink());
    let output = controller.execute(&inputs);
    println!("{}\n\n{}", output.prompt, output.status_log);
}

fn read_pools(paths: &[PathBuf]) -> PoolInputs {
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let text = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read pool '{}': {}", path.display(), e))
            });
            (i as u32 + 1, text)
        })
        .collect()
}

fn sink() -> Arc<dyn SignalSink> {
    Arc::new(LogSink)
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
