use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::error;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pure_recipe::catalog::{self, BrowseOutcome, Catalog};
use pure_recipe::{batch, RecipeError, Settings};

#[derive(Parser)]
#[command(name = "pure-recipe", about = "Make recipes pretty again.")]
struct Cli {
    /// What to do
    #[arg(value_enum)]
    operation: Operation,

    /// Recipe URL for view/save, or a file of URLs (one per line) for list
    target: Option<String>,

    /// Settings file (defaults to config.toml in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Operation {
    /// Print a recipe to the terminal
    View,
    /// Save a recipe as a markdown file
    Save,
    /// Save every recipe listed in a file
    List,
    /// Pick a saved recipe to display
    Browse,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), RecipeError> {
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.operation {
        Operation::View => {
            let url = required_target(cli);
            println!("\n{}", pure_recipe::view_recipe(url, &settings)?);
        }
        Operation::Save => {
            let url = required_target(cli);
            let path = pure_recipe::save_recipe(url, &settings)?;
            println!("{}", path.display());
        }
        Operation::List => {
            let list = required_target(cli);
            let pipeline = pure_recipe::pipeline(&settings)?;
            batch::run(&pipeline, Path::new(list))?;
        }
        Operation::Browse => {
            let dir = settings.library_dir()?;
            println!("{}", dir.display());
            let catalog = Catalog::open(&dir)?;
            if let BrowseOutcome::Displayed(path) =
                catalog::browse(&catalog, io::stdin().lock(), io::stdout().lock())?
            {
                log::debug!("Displayed {}", path.display());
            }
        }
    }

    Ok(())
}

/// The positional target, or a usage error (exit code 2) when it is missing
fn required_target(cli: &Cli) -> &str {
    match cli.target.as_deref() {
        Some(target) if !target.trim().is_empty() => target.trim(),
        _ => {
            use clap::CommandFactory;
            Cli::command()
                .error(
                    clap::error::ErrorKind::MissingRequiredArgument,
                    "this operation needs a URL or file argument",
                )
                .exit()
        }
    }
}
