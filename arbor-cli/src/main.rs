//! Terminal front-end for the arbor tree engine.

mod error;
mod interactive;
mod loader;
mod view;

use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Duration;

use arbor::key::{Key, KeyCombo};
use arbor::tree::{KeyOutcome, NodeKey, SelectionMode, Tree, TreeConfig, TreeNode};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use simplelog::{Config, LevelFilter, WriteLogger};

use crate::error::CliError;
use crate::loader::SimulatedLoader;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// One node at a time
    Single,
    /// Independent checkboxes
    Multiple,
    /// Checkboxes that cascade to children and parents
    MultipleRecursive,
}

impl From<ModeArg> for SelectionMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Single => SelectionMode::Single,
            ModeArg::Multiple => SelectionMode::Multiple,
            ModeArg::MultipleRecursive => SelectionMode::MultipleRecursive,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(about = "Explore a tree with keyboard navigation, selection and lazy loading")]
struct Args {
    /// JSON file with the root items (`[{"id": 1, "name": "Root", "children": [...]}]`)
    file: Option<PathBuf>,

    /// Selection mode
    #[arg(long, value_enum, default_value = "single")]
    mode: ModeArg,

    /// Node ids expanded on start
    #[arg(long, value_delimiter = ',')]
    expand: Vec<NodeKey>,

    /// Load missing children from a simulated remote source
    #[arg(long)]
    lazy: bool,

    /// Simulated load latency in milliseconds
    #[arg(long, default_value_t = 300)]
    latency: u64,

    /// Children generated per lazy load
    #[arg(long, default_value_t = 3)]
    fanout: usize,

    /// Node ids whose lazy load fails
    #[arg(long, value_delimiter = ',')]
    fail: Vec<NodeKey>,

    /// Milliseconds a collapsed subtree stays in the navigation order
    #[arg(long, default_value_t = 250)]
    collapse_delay: u64,

    /// Script to replay, e.g. `down,right,space,click:2`
    #[arg(long, value_delimiter = ',')]
    keys: Vec<String>,

    /// Run interactively in the terminal
    #[arg(short, long)]
    interactive: bool,

    /// Log level
    #[arg(long, default_value = "debug")]
    log_level: LevelFilter,

    /// Log file
    #[arg(long, default_value = "arbor-cli.log")]
    log_file: PathBuf,
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq)]
enum Step {
    Key(KeyCombo),
    Click(NodeKey),
}

fn parse_step(step: &str) -> Result<Step, CliError> {
    if let Some(id) = step.strip_prefix("click:") {
        // NodeKey parsing is infallible
        let id = id.parse::<NodeKey>().unwrap_or_else(|never| match never {});
        return Ok(Step::Click(id));
    }
    step.parse::<Key>()
        .map(|key| Step::Key(KeyCombo::key(key)))
        .map_err(|source| CliError::Step {
            step: step.to_string(),
            source,
        })
}

fn sample_items() -> Vec<TreeNode> {
    vec![
        TreeNode::new(1, "Documents").with_children(vec![
            TreeNode::new(2, "Invoices").with_children(vec![
                TreeNode::new(4, "2023.pdf"),
                TreeNode::new(5, "2024.pdf"),
            ]),
            TreeNode::new(3, "Notes"),
        ]),
        TreeNode::new(6, "Pictures"),
    ]
}

fn build_tree(args: &Args, items: Vec<TreeNode>) -> Tree<TreeNode> {
    let config = TreeConfig::new()
        .with_selection_mode(args.mode.into())
        .with_default_expanded_keys(args.expand.iter().cloned())
        .with_collapse_delay(Duration::from_millis(args.collapse_delay))
        .with_on_selection_change(|keys| debug!("Selection changed: {} selected", keys.len()))
        .with_on_load_error(|e| warn!("{}", e));

    let builder = Tree::builder().items(items).config(config);
    if args.lazy {
        let loader = SimulatedLoader::new(Duration::from_millis(args.latency), args.fanout)
            .with_failing(args.fail.iter().cloned());
        builder.loader(loader).build()
    } else {
        builder.build()
    }
}

/// Replay the script, waiting for every load a step starts.
async fn replay(tree: &Tree<TreeNode>, steps: &[Step]) {
    for step in steps {
        let outcome = match step {
            Step::Key(combo) => tree.on_key(combo),
            Step::Click(id) => tree.click(id),
        };
        debug!("{:?} -> consumed: {}", step, outcome.is_consumed());
        if let KeyOutcome::Loading(load) = outcome
            && let Err(e) = load.await
        {
            info!("Load finished with error: {}", e);
        }
        tree.settle();
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let items = match &args.file {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => sample_items(),
    };
    let steps = args
        .keys
        .iter()
        .map(|step| parse_step(step))
        .collect::<Result<Vec<_>, _>>()?;

    let tree = build_tree(&args, items);
    info!("Loaded tree with {} nodes", tree.len());

    if args.interactive {
        replay(&tree, &steps).await;
        return interactive::run(&tree).await;
    }

    replay(&tree, &steps).await;
    for line in view::render(&tree) {
        println!("{line}");
    }
    let mut selected: Vec<String> = tree.selected_keys().iter().map(|k| k.to_string()).collect();
    selected.sort();
    println!("selected: [{}]", selected.join(", "));
    if let Some(focus) = tree.focused() {
        println!("focus: {focus}");
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match File::create(&args.log_file) {
        Ok(log_file) => {
            if let Err(e) = WriteLogger::init(args.log_level, Config::default(), log_file) {
                eprintln!("Failed to initialize logger: {}", e);
            }
        }
        Err(e) => eprintln!("Failed to create log file: {}", e),
    }

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
