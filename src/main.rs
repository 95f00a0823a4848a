use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::PathBuf;
use texscribe::checker::SpellChecker;
use texscribe::cli::output::{self, OutputFormat};
use texscribe::client::compile::{FullCompileOptions, FULL_TIMEOUT};
use texscribe::client::panels::{CitationSort, FileNode, Panel};
use texscribe::client::ApiClient;
use texscribe::{dict, ClientStore, Config};

#[derive(Parser, Debug)]
#[command(name = "texscribe")]
#[command(version, about = "LaTeX manuscript spell checking and compilation", long_about = None)]
struct Cli {
    /// Files or directories to check (.tex files are discovered recursively)
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Fix misspellings in place (auto-apply top suggestion)
    #[arg(short, long)]
    fix: bool,

    /// Interactive mode for selecting corrections
    #[arg(short, long, requires = "fix")]
    interactive: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if errors are found
    #[arg(long)]
    no_fail: bool,

    /// Language/dictionary to use (e.g., en_US, en_GB) [default: en_US]
    #[arg(short, long)]
    language: Option<String>,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Add words to the custom dictionary
    #[arg(long)]
    add_to_dict: Vec<String>,

    /// Base URL of the manuscript backend
    #[arg(long)]
    backend_url: Option<String>,

    /// Project id on the backend
    #[arg(long)]
    project: Option<u64>,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
    /// Remote compilation through the manuscript backend
    Compile {
        #[command(subcommand)]
        action: CompileCommands,
    },
    /// Browse project assets exposed by the backend
    Panels {
        #[command(subcommand)]
        action: PanelCommands,
    },
}

#[derive(Parser, Debug)]
enum DictCommands {
    /// List installed dictionaries
    List,
    /// Download a dictionary
    Download {
        /// Language code (e.g., en_US, en_GB)
        language: String,
    },
    /// Update all dictionaries
    Update,
    /// Show dictionary info
    Info {
        /// Language code
        language: String,
    },
}

#[derive(Parser, Debug)]
enum CompileCommands {
    /// Compile a single section for a quick preview
    Preview {
        /// Section file to compile
        file: PathBuf,

        /// Section name reported to the backend
        #[arg(long, default_value = "main")]
        section: String,

        /// Preview color mode (light, dark)
        #[arg(long, default_value = "light")]
        color_mode: String,
    },
    /// Run a full workspace build
    Full {
        /// Document type to build
        #[arg(long, default_value = "manuscript")]
        doc_type: String,

        /// Skip figure regeneration
        #[arg(long)]
        no_figs: bool,

        /// Convert PowerPoint figures to TIFF
        #[arg(long)]
        ppt2tif: bool,

        /// Crop TIFF figures
        #[arg(long)]
        crop_tif: bool,

        /// Verbose backend build log
        #[arg(long)]
        verbose: bool,

        /// Force a rebuild even when sources are unchanged
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
enum PanelCommands {
    /// List bibliography entries
    Citations {
        /// Filter entries by a search string
        #[arg(long)]
        search: Option<String>,

        /// Sort order (key, year, title)
        #[arg(long, default_value = "key")]
        sort: String,
    },
    /// List project figures
    Figures,
    /// List project tables
    Tables,
    /// Show the project file tree
    Tree,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "texscribe", &mut io::stdout());
        return Ok(());
    }

    let config = Config::load(cli.language.clone(), cli.backend_url.clone(), cli.project)?;

    if let Some(command) = cli.command {
        return handle_command(command, &config, !cli.no_color);
    }

    let mut store = ClientStore::open_default();

    if !cli.add_to_dict.is_empty() {
        add_words(&mut store, &cli.add_to_dict);
        if cli.files.is_empty() {
            return Ok(());
        }
    }

    if cli.files.is_empty() {
        anyhow::bail!("No files specified. Use --help for usage information.");
    }

    let files = collect_tex_files(&cli.files);
    if files.is_empty() {
        anyhow::bail!("No .tex files found under the given paths.");
    }

    let checker = SpellChecker::new(&config, &store)?;

    let mut total_errors = 0;
    let mut total_fixed = 0;

    if cli.fix {
        let mut checker = checker;
        for file_path in &files {
            let result = if cli.interactive {
                checker.fix_interactive(file_path, &mut store)?
            } else {
                checker.fix_auto(file_path)?
            };
            total_fixed += result.fixed_count;
        }
    } else {
        // Checking is read-only, so files fan out across the thread pool;
        // results print afterwards in input order.
        let results: Vec<_> = files
            .par_iter()
            .map(|file_path| (file_path, checker.check(file_path)))
            .collect();

        for (file_path, result) in results {
            match result {
                Ok(result) => {
                    output::print_errors(file_path, &result, !cli.no_color, &cli.format);
                    total_errors += result.error_count;
                }
                Err(err) => eprintln!("Error: {:#}", err),
            }
        }
    }

    if cli.fix {
        output::print_fix_summary(total_fixed, &files, !cli.no_color);
    } else {
        output::print_check_summary(total_errors, &files, !cli.no_color);
    }

    if total_errors > 0 && !cli.no_fail && !cli.fix {
        std::process::exit(1);
    }

    Ok(())
}

/// Expand directories into the .tex files beneath them, honoring ignore
/// files along the way. Explicitly named files pass through unchanged.
fn collect_tex_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            for entry in WalkBuilder::new(input).build().flatten() {
                let path = entry.path();
                let is_tex = path.extension().and_then(|e| e.to_str()) == Some("tex");
                if path.is_file() && is_tex {
                    files.push(path.to_path_buf());
                }
            }
        } else if input.exists() {
            files.push(input.clone());
        } else {
            eprintln!("Error: File not found: {}", input.display());
        }
    }

    files.sort();
    files.dedup();
    files
}

fn add_words(store: &mut ClientStore, words: &[String]) {
    let mut dictionary = store.custom_dictionary();
    for word in words {
        let lower = word.to_lowercase();
        if !dictionary.contains(&lower) {
            dictionary.push(lower);
        }
    }
    dictionary.sort();
    store.set_custom_dictionary(&dictionary);

    println!(
        "Added {} {} to the custom dictionary",
        words.len(),
        if words.len() == 1 { "word" } else { "words" }
    );
}

fn api_client(config: &Config) -> Result<ApiClient> {
    let base_url = config.backend_url.as_deref().context(
        "No backend configured. Pass --backend-url or set backend_url in the config file.",
    )?;
    let project_id = config
        .project_id
        .context("No project configured. Pass --project or set project_id in the config file.")?;

    Ok(ApiClient::new(base_url, project_id)?)
}

fn handle_command(command: Commands, config: &Config, colored: bool) -> Result<()> {
    match command {
        Commands::Dict { action } => match action {
            DictCommands::List => dict::manager::list_dictionaries()?,
            DictCommands::Download { language } => dict::manager::download_dictionary(&language)?,
            DictCommands::Update => dict::manager::update_dictionaries()?,
            DictCommands::Info { language } => dict::manager::show_info(&language)?,
        },
        Commands::Compile { action } => handle_compile(action, config, colored)?,
        Commands::Panels { action } => handle_panels(action, config)?,
    }
    Ok(())
}

fn handle_compile(action: CompileCommands, config: &Config, colored: bool) -> Result<()> {
    let client = api_client(config)?;

    match action {
        CompileCommands::Preview {
            file,
            section,
            color_mode,
        } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read file: {}", file.display()))?;

            match client.compile_preview(&content, &section, &color_mode)? {
                Some(outcome) => output::print_preview_outcome(&outcome, colored),
                None => output::print_busy_notice(colored),
            }
        }
        CompileCommands::Full {
            doc_type,
            no_figs,
            ppt2tif,
            crop_tif,
            verbose,
            force,
        } => {
            let options = FullCompileOptions {
                doc_type,
                timeout: FULL_TIMEOUT.as_secs(),
                no_figs,
                ppt2tif,
                crop_tif,
                quiet: !verbose,
                verbose,
                force,
            };

            let pb = output::compile_progress_bar();
            let result = client.compile_full(&options, |job| {
                output::update_compile_progress(&pb, job);
            });
            pb.finish_and_clear();

            match result? {
                Some(outcome) => output::print_full_outcome(&outcome, colored),
                None => output::print_busy_notice(colored),
            }
        }
    }

    Ok(())
}

fn handle_panels(action: PanelCommands, config: &Config) -> Result<()> {
    let client = api_client(config)?;

    match action {
        PanelCommands::Citations { search, sort } => {
            let mut panel = Panel::default();
            panel.set_items(client.fetch_citations()?);
            panel.sort(citation_sort(&sort)?);
            if let Some(query) = &search {
                panel.set_query(query);
            }

            for (_, citation) in panel.visible() {
                let year = citation
                    .year
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "----".to_string());
                println!("{}  {}  {}", citation.key, year, citation.title);
            }
        }
        PanelCommands::Figures => {
            for figure in client.fetch_figures()? {
                println!(
                    "{}  {}  {}",
                    figure.name,
                    figure.path,
                    figure.caption.as_deref().unwrap_or("")
                );
            }
        }
        PanelCommands::Tables => {
            for table in client.fetch_tables()? {
                println!(
                    "{}  {}  {}",
                    table.name,
                    table.path,
                    table.caption.as_deref().unwrap_or("")
                );
            }
        }
        PanelCommands::Tree => {
            for node in client.fetch_file_tree()? {
                print_tree(&node, 0);
            }
        }
    }

    Ok(())
}

fn citation_sort(name: &str) -> Result<CitationSort> {
    match name {
        "key" => Ok(CitationSort::Key),
        "year" => Ok(CitationSort::YearDesc),
        "title" => Ok(CitationSort::Title),
        other => anyhow::bail!("Unknown sort order: {} (expected key, year, or title)", other),
    }
}

fn print_tree(node: &FileNode, depth: usize) {
    let suffix = if node.is_dir { "/" } else { "" };
    println!("{}{}{}", "  ".repeat(depth), node.name, suffix);
    for child in &node.children {
        print_tree(child, depth + 1);
    }
}
