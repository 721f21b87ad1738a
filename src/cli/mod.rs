pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cookbook")]
#[command(about = "Index, watch and search a directory of markdown recipes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory containing .md recipe files
    #[arg(long, global = true, env = "RECIPES_PATH")]
    pub recipes: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the recipes and keep the index in sync until interrupted
    Watch,

    /// List recipes grouped by tag
    Tags {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Full-text search over recipe names and bodies
    Search {
        /// Search query
        query: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the rendered HTML of one recipe
    Show {
        /// Recipe webpath, e.g. ChickenSoup
        webpath: String,
    },
}
