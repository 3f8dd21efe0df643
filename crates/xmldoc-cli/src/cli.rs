use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "xmldoc",
    about = "Store, fetch, and list well-formed XML documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage root, overriding the configuration
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Create the storage root
    Init,
    /// Store a local XML file
    Add(AddArgs),
    /// Fetch a stored document
    Get(GetArgs),
    /// List stored documents
    List(ListArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct AddArgs {
    /// File to upload
    pub file: PathBuf,
    /// Note recorded with the document
    #[arg(short, long)]
    pub note: String,
    /// Name to store under (defaults to the file's name)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct GetArgs {
    pub name: String,
    /// Write to this path instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}
