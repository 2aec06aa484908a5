//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// a4e - Eclipse workspace build order and classpaths for headless builds
#[derive(Parser)]
#[command(name = "a4e")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Workspace directory (defaults to the current directory)
    #[arg(short, long, global = true, env = "A4E_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, global = true, default_value = "text")]
    pub format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the order in which projects have to be built
    BuildOrder(BuildOrderArgs),

    /// Resolve the classpath of a Java project
    Classpath(ClasspathArgs),

    /// Show the projects of the workspace and the configured resolvers
    Info,
}

#[derive(Args)]
pub struct BuildOrderArgs {
    /// Projects to order (defaults to every project of the workspace)
    pub projects: Vec<String>,

    /// Reference types to follow (platform, jdt, pde, cdt, pydt)
    #[arg(short = 't', long = "type", value_delimiter = ',')]
    pub types: Vec<String>,
}

#[derive(Args)]
pub struct ClasspathArgs {
    /// Project to resolve
    pub project: String,

    /// Include the project's own output folders
    #[arg(long)]
    pub runtime: bool,

    /// Print locations relative to the workspace
    #[arg(long)]
    pub relative: bool,

    /// Print a single path string instead of one entry per line
    #[arg(long)]
    pub path: bool,

    /// Target platform used to resolve required plug-ins
    #[arg(long)]
    pub target_platform: Option<String>,

    /// Container argument (KEY=VALUE), may be repeated
    #[arg(short = 'D', long = "arg", value_name = "KEY=VALUE")]
    pub arguments: Vec<String>,
}
