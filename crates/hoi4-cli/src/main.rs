//! HOI4 States CLI
//!
//! Command-line tool for reassigning provinces between state files and
//! creating new states.

use clap::{Parser, Subcommand};
use hoi4_core::{
    apply_plan, create_state, is_valid_tag, list_state_files, load_country_tags, next_state_id,
    parse_id_list, plan_reassignment, Config, NewStateSpec, ProvincesBlock, ReassignRequest,
    ReassignResult, StateCategory, Workspace,
};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hoi4-states")]
#[command(about = "Reassign provinces between HOI4 states", long_about = None)]
#[command(version)]
struct Cli {
    /// Mod folder (defaults to the current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// States directory, overriding the config file
    #[arg(long, global = true)]
    states_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List state files and their provinces
    Scan {
        /// Print the scan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move provinces into an existing state
    Reassign {
        /// Target state ID
        #[arg(short, long)]
        to: String,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Province IDs to move
        #[arg(required = true)]
        provinces: Vec<String>,
    },

    /// Create a new state from a set of provinces
    CreateState {
        /// Display name for the new state
        #[arg(short, long)]
        name: String,

        /// State category (e.g. town, city, rural)
        #[arg(short, long)]
        category: String,

        /// Owner country tag
        #[arg(short, long)]
        owner: String,

        /// Country tags with cores on the state
        #[arg(long = "core")]
        cores: Vec<String>,

        /// Print the new state file without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Province IDs for the new state
        #[arg(required = true)]
        provinces: Vec<String>,
    },

    /// Print the next free state ID
    NextId,

    /// Report provinces listed by more than one state
    Check,

    /// List country tags defined in the workspace
    Tags,

    /// Write a config file with the default paths
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> hoi4_core::Result<()> {
    let workspace = Workspace::open(cli.workspace)?;
    let states_dir = cli.states_dir.map(|dir| workspace.root.join(dir));

    match cli.command {
        Commands::Scan { json } => cmd_scan(&workspace, states_dir, json),
        Commands::Reassign {
            to,
            dry_run,
            provinces,
        } => cmd_reassign(&workspace, states_dir, &provinces, &to, dry_run),
        Commands::CreateState {
            name,
            category,
            owner,
            cores,
            dry_run,
            provinces,
        } => cmd_create_state(
            &workspace,
            states_dir,
            CreateArgs {
                name,
                category,
                owner,
                cores,
                provinces,
            },
            dry_run,
        ),
        Commands::NextId => cmd_next_id(&workspace, states_dir),
        Commands::Check => cmd_check(&workspace, states_dir),
        Commands::Tags => cmd_tags(&workspace),
        Commands::InitConfig { force } => cmd_init_config(&workspace, force),
    }
}

/// Resolve the states directory from the override or the config
fn resolve_states_dir(
    workspace: &Workspace,
    override_dir: Option<PathBuf>,
) -> hoi4_core::Result<PathBuf> {
    match override_dir {
        Some(dir) if dir.is_dir() => Ok(dir),
        Some(dir) => Err(hoi4_core::Error::DirectoryMissing(dir)),
        None => workspace.states_dir(),
    }
}

fn cmd_scan(
    workspace: &Workspace,
    states_dir: Option<PathBuf>,
    json: bool,
) -> hoi4_core::Result<()> {
    let dir = resolve_states_dir(workspace, states_dir)?;
    let result = list_state_files(&dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Scanned {}", result.directory.display());
    println!();

    for state in &result.states {
        let provinces = match &state.provinces {
            ProvincesBlock::Present { ids, .. } => format!("{} provinces", ids.len()),
            ProvincesBlock::Missing => "no provinces block".to_string(),
            ProvincesBlock::Malformed { reason } => format!("malformed provinces block: {}", reason),
        };
        println!("  {:>5}  {} ({})", state.id, state.display_name(), provinces);
    }

    println!();
    println!("Found {} states", result.states.len());

    if !result.ignored.is_empty() {
        println!("\nIgnored {} file(s) without a state id:", result.ignored.len());
        for path in &result.ignored {
            println!("  {}", path.display());
        }
    }

    if !result.skipped.is_empty() {
        println!("\nSkipped {} unreadable file(s):", result.skipped.len());
        for file in &result.skipped {
            println!("  {}: {}", file.path.display(), file.reason);
        }
    }

    Ok(())
}

fn cmd_reassign(
    workspace: &Workspace,
    states_dir: Option<PathBuf>,
    provinces: &[String],
    target: &str,
    dry_run: bool,
) -> hoi4_core::Result<()> {
    // Validate the request before touching the directory
    let request = ReassignRequest::parse(&provinces.join(" "), target)?;
    let dir = resolve_states_dir(workspace, states_dir)?;

    let scan = list_state_files(&dir)?;
    let plan = plan_reassignment(&scan, &request)?;

    if plan.is_empty() {
        println!(
            "Provinces {} already belong to state {}. Nothing to do.",
            join(request.provinces()),
            request.target()
        );
        return Ok(());
    }

    if dry_run {
        println!("Dry run, no files written.\n");
        print_reassign_result(&plan.summary());
        return Ok(());
    }

    let result = apply_plan(&plan)?;
    println!(
        "Successfully reassigned provinces {} to state {}.\n",
        join(request.provinces()),
        request.target()
    );
    print_reassign_result(&result);

    Ok(())
}

/// Arguments of the create-state command
struct CreateArgs {
    name: String,
    category: String,
    owner: String,
    cores: Vec<String>,
    provinces: Vec<String>,
}

fn cmd_create_state(
    workspace: &Workspace,
    states_dir: Option<PathBuf>,
    args: CreateArgs,
    dry_run: bool,
) -> hoi4_core::Result<()> {
    let name = args.name.trim().to_string();
    if name.is_empty() {
        return Err(hoi4_core::Error::InvalidInput(
            "please enter a state name".to_string(),
        ));
    }

    let category: StateCategory = args.category.parse()?;
    let provinces = parse_id_list(&args.provinces.join(" "))?;

    let owner = args.owner.trim().to_string();
    let cores: Vec<String> = args.cores.iter().map(|c| c.trim().to_string()).collect();
    for tag in std::iter::once(&owner).chain(cores.iter()) {
        if !is_valid_tag(tag) {
            return Err(hoi4_core::Error::InvalidInput(format!(
                "invalid tag '{}', tags must be 3-character codes",
                tag
            )));
        }
    }

    let known_tags = load_country_tags(workspace.country_tags_dir())?;
    if !known_tags.is_empty() {
        for tag in std::iter::once(&owner).chain(cores.iter()) {
            if !known_tags.contains(tag) {
                warn!(tag = %tag, "tag is not defined in the country tags directory");
            }
        }
    }

    let dir = resolve_states_dir(workspace, states_dir)?;
    let spec = NewStateSpec {
        id: next_state_id(&dir)?,
        name,
        category,
        owner,
        cores,
        provinces,
    };

    if dry_run {
        println!("Dry run, would write {}:\n", dir.join(spec.file_name()).display());
        println!("{}", spec.render());
        return Ok(());
    }

    let localisation = workspace.localisation_file();
    let created = create_state(&dir, &spec, Some(&localisation))?;

    println!(
        "Created state {} \"{}\" with provinces {} in \"{}\".",
        created.id,
        spec.name,
        join(&spec.provinces),
        spec.file_name()
    );
    match &created.localisation {
        Some(path) => println!("Recorded name in {}", path.display()),
        None => println!("Warning: localisation file could not be updated"),
    }
    println!();
    print_reassign_result(&created.reassignment);

    Ok(())
}

fn cmd_next_id(workspace: &Workspace, states_dir: Option<PathBuf>) -> hoi4_core::Result<()> {
    let dir = resolve_states_dir(workspace, states_dir)?;
    println!("{}", next_state_id(&dir)?);
    Ok(())
}

fn cmd_check(workspace: &Workspace, states_dir: Option<PathBuf>) -> hoi4_core::Result<()> {
    let dir = resolve_states_dir(workspace, states_dir)?;
    let result = list_state_files(&dir)?;
    let contested = result.contested_provinces();

    if contested.is_empty() {
        println!(
            "All provinces belong to exactly one of {} states.",
            result.states.len()
        );
        return Ok(());
    }

    println!("Provinces listed by more than one state ({}):", contested.len());
    for (province, states) in &contested {
        println!("  {}: states {}", province, join(states));
    }
    std::process::exit(1);
}

fn cmd_tags(workspace: &Workspace) -> hoi4_core::Result<()> {
    let dir = workspace.country_tags_dir();
    let tags = load_country_tags(&dir)?;

    if tags.is_empty() {
        println!("No country tags found in {}", dir.display());
        return Ok(());
    }

    println!("Country tags ({}):", tags.len());
    for tag in &tags {
        println!("  {}", tag);
    }

    Ok(())
}

fn cmd_init_config(workspace: &Workspace, force: bool) -> hoi4_core::Result<()> {
    let path = workspace.config_path();
    if path.exists() && !force {
        println!(
            "Config file {} already exists, use --force to overwrite.",
            path.display()
        );
        return Ok(());
    }

    Config::default().save(&path)?;
    println!("Created config file: {}", path.display());

    Ok(())
}

fn print_reassign_result(result: &ReassignResult) {
    if !result.added.is_empty() {
        println!("State {} gains: {}", result.target, join(&result.added));
    }

    for (state, provinces) in &result.removed_from {
        println!("State {} loses: {}", state, join(provinces));
    }

    println!("\nFiles modified ({}):", result.files_written.len());
    for path in &result.files_written {
        println!("  {}", path.display());
    }

    if !result.is_complete() {
        println!(
            "\nWarning: {} state file(s) could not be read and were not checked:",
            result.skipped.len()
        );
        for file in &result.skipped {
            println!("  {} ({})", file.path.display(), file.reason);
        }
    }
}

fn join(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
