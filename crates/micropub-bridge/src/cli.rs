use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "mpb", version)]
#[command(about = "Micropub bridge: publish posts into a site working copy")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/micropub-bridge/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a post from a JSON payload or form fields
    Create {
        /// Structured payload: {"type": ["h-entry"], "properties": {...}}
        #[arg(long, value_name = "FILE", conflicts_with_all = ["fields", "files"])]
        json: Option<PathBuf>,

        /// Form field, repeatable (e.g. --field content=hello --field category[]=a)
        #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,

        /// Attach a file to a form field (e.g. --file photo=cat.jpg)
        #[arg(long = "file", value_name = "KEY=PATH", value_parser = parse_key_value)]
        files: Vec<(String, String)>,

        /// Client identifier recorded with the post
        #[arg(long)]
        client_id: Option<String>,
    },

    /// Apply a replace/add/delete patch to a post
    Update {
        /// Public URL of the post
        #[arg(long)]
        url: String,

        /// JSON file with exactly one of "replace", "add" or "delete"
        #[arg(long, value_name = "FILE")]
        patch: PathBuf,
    },

    /// Delete a post (tombstone unless --permanent or permanent_delete is set)
    Delete {
        /// Public URL of the post
        #[arg(long)]
        url: String,

        /// Remove the file instead of marking it deleted
        #[arg(long)]
        permanent: bool,
    },

    /// Restore a tombstoned post
    Undelete {
        /// Public URL of the post
        #[arg(long)]
        url: String,
    },

    /// Print a post's properties (Micropub q=source)
    Source {
        /// Public URL of the post
        #[arg(long)]
        url: String,

        /// Only return these properties (repeatable)
        #[arg(long = "property", value_name = "NAME")]
        properties: Vec<String>,
    },

    /// Upload or list media files
    Media {
        #[command(subcommand)]
        cmd: MediaCommands,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum MediaCommands {
    /// Upload a file to the media directory
    Upload {
        /// File to upload
        path: PathBuf,
    },

    /// List uploaded files, newest first
    List {
        #[arg(long, default_value_t = 10)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration (file plus environment overrides)
    Show,
    /// Print a commented configuration template
    Template,
}

/// Split `key=value` at the first `=`.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
