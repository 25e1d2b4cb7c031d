use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "weekproject",
    about = "The Week Project: users, projects, and weekly progress updates",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Data directory of the store (overrides the config file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// TOML file with store settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Record social identities
    Social(SocialArgs),
    /// Create and inspect users
    User(UserArgs),
    /// Create and inspect projects
    Project(ProjectArgs),
    /// Record and list progress updates
    Update(UpdateArgs),
}

#[derive(Args)]
pub struct SocialArgs {
    #[command(subcommand)]
    pub action: SocialAction,
}

#[derive(Subcommand)]
pub enum SocialAction {
    /// Store the identity `<provider>-<id>`
    Add { provider: String, id: String, name: String },
    /// Show one identity by its provider-qualified id
    Show { id: String },
}

#[derive(Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub action: UserAction,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Create or replace a user
    Add {
        name: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        email: String,
    },
    /// Show one user
    Show { name: String },
    /// List every user
    List,
}

#[derive(Args)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a project; its name is derived from the title
    New {
        owner: String,
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Show one project
    Show { owner: String, name: String },
    /// List the projects of one owner
    List { owner: String },
}

#[derive(Args)]
pub struct UpdateArgs {
    #[command(subcommand)]
    pub action: UpdateAction,
}

#[derive(Subcommand)]
pub enum UpdateAction {
    /// Append a progress update to a project
    Add {
        owner: String,
        project: String,
        progress: u8,
        status: String,
    },
    /// List the updates of a project, oldest first
    List { owner: String, project: String },
}
