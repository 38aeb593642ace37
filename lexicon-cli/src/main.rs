use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};
use log::debug;

use lexicon_core::io::{ModelStore, load_or_build, read_corpus};
use lexicon_core::{AnswerFilter, Config, Generator, ModelBuilder};

/// Longest answer drawn by `ask`.
const ANSWER_LIMIT: usize = 1000;

#[derive(Parser, Debug)]
#[command(name = "lexicon", version, about = "Build n-gram models from text, generate text and answer questions")]
struct Cli {
    /// Model directory
    #[arg(long, env = "LEXICON_STORE", default_value = "./data", global = true)]
    store: PathBuf,

    /// JSON configuration file
    #[arg(long, env = "LEXICON_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a model from a text file and store it
    Build {
        corpus: PathBuf,
        name: String,
        /// Free-form description shown by `list`
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Merge a text file into a stored model, through the `.bin` cache next to it
    Extend { corpus: PathBuf, name: String },
    /// Replace the description of a stored model
    Describe { name: String, description: String },
    /// List stored models
    List,
    /// Delete a stored model
    Delete { name: String },
    /// Rename a stored model
    Rename { name: String, new_name: String },
    /// Generate text, optionally continuing the seed words
    Generate {
        name: String,
        length: usize,
        seed: Vec<String>,
    },
    /// Answer a question ending with '?'
    Ask {
        name: String,
        #[arg(required = true)]
        question: Vec<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let store = ModelStore::open(&cli.store)?;
    debug!("using store {}", store.root().display());

    match cli.command {
        Commands::Build { corpus, name, description } => {
            let text = read_corpus(&corpus)?;
            let model = ModelBuilder::from_config(&config)?.build_from_text(&text, &config.tokenizer())?;
            store.save(&name, &model)?;
            if let Some(description) = description {
                store.describe(&name, &description)?;
            }
            println!("Model '{name}' added: {model}");
        }
        Commands::Extend { corpus, name } => {
            let mut model = store.load(&name)?;
            model.merge(&load_or_build(&corpus, &config)?)?;
            store.save(&name, &model)?;
            println!("Model '{name}' updated: {model}");
        }
        Commands::Describe { name, description } => {
            store.describe(&name, &description)?;
            println!("Model '{name}' described.");
        }
        Commands::List => {
            let names = store.list()?;
            if names.is_empty() {
                println!("No model found.");
            }
            for name in names {
                let info = store.info(&name)?;
                println!("{name}\t{}\t{}", info.created_at.format("%Y-%m-%d %H:%M"), info.description);
            }
        }
        Commands::Delete { name } => {
            if store.delete(&name)? {
                println!("Model '{name}' deleted.");
            } else {
                println!("Model '{name}' not found.");
            }
        }
        Commands::Rename { name, new_name } => {
            store.rename(&name, &new_name)?;
            println!("Model '{name}' renamed to '{new_name}'.");
        }
        Commands::Generate { name, length, seed } => {
            let model = store.load(&name)?;
            let tokenizer = config.tokenizer();
            let mut generator = Generator::new(&model, &tokenizer, rand::rng()).with_history(config.history);
            println!("{}", generator.generate_text(&seed.join(" "), length)?);
        }
        Commands::Ask { name, question } => {
            let model = store.load(&name)?;
            let tokenizer = config.tokenizer();
            let generator = Generator::new(&model, &tokenizer, rand::rng()).with_history(config.history);
            let mut filter = AnswerFilter::new(generator)
                .with_lengths(config.answer_min_length, config.fallback_min_length);
            println!("{}", filter.answer(&question.join(" "), ANSWER_LIMIT)?);
        }
    }

    Ok(())
}
