//! Command-line surface for `contentdesk-cli`.

#![deny(clippy::all, clippy::pedantic)]

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use contentdesk::config::ConfigArgs;
use contentdesk_api_types::StatusFilter;

#[derive(Parser, Debug)]
#[command(
    name = "contentdesk-cli",
    version,
    about = "Content admin API command-line client",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Answer yes to every confirmation prompt
    #[arg(long, short = 'y', global = true, default_value_t = false)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the session cookies
    Login(LoginArgs),
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Promotion banners
    Promotions(ContentArgs),
    /// Hero media
    Heroes(ContentArgs),
    /// Games news
    Games(ContentArgs),
    /// News articles
    News(ContentArgs),
    /// Company profile
    Company(CompanyArgs),
    /// Contact inquiries
    Contacts(ContactsArgs),
}

#[derive(Parser, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    /// File holding the password (takes precedence over env)
    #[arg(long, env = "CONTENTDESK_PASSWORD_FILE")]
    pub password_file: Option<PathBuf>,

    /// Password from env (no CLI flag, to keep it out of shell history)
    #[arg(hide = true, env = "CONTENTDESK_PASSWORD")]
    pub password_env: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ContentArgs {
    #[command(subcommand)]
    pub action: ContentCmd,
}

#[derive(Subcommand, Debug)]
pub enum ContentCmd {
    /// List one page of items
    List {
        /// Only honored by banners and heroes
        #[arg(long, default_value_t = StatusArg::All)]
        status: StatusArg,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
    /// Show one item
    Get { id: i64 },
    /// Delete a published item
    Delete { id: i64 },
    /// Switch an item on (banners and heroes)
    Activate { id: i64 },
    /// Switch an item off (banners and heroes)
    Deactivate { id: i64 },
    /// Save the order of a page: ids in their new order
    Reorder {
        #[arg(required = true, value_delimiter = ',')]
        ids: Vec<i64>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
    /// Move one item to a position on its page
    Move {
        id: i64,
        /// Zero-based target position
        #[arg(long)]
        to: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
    /// Write a draft and publish it
    Create(DraftFieldArgs),
    /// Edit a published item
    Edit {
        id: i64,
        #[command(flatten)]
        fields: EditFieldArgs,
    },
}

#[derive(Parser, Debug, Default)]
pub struct DraftFieldArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long)]
    pub content_file: Option<PathBuf>,
    /// Hashtag (news); repeat for more
    #[arg(long = "hashtag")]
    pub hashtags: Vec<String>,
    /// Platform link as PLATFORM=URL (games); repeat for more
    #[arg(long = "platform")]
    pub platforms: Vec<String>,
    /// Image or video to attach
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Delete the draft instead of publishing it
    #[arg(long, default_value_t = false)]
    pub discard: bool,
}

#[derive(Parser, Debug, Default)]
pub struct EditFieldArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long)]
    pub content_file: Option<PathBuf>,
    /// Replacement platform links as PLATFORM=URL (games); repeat for more
    #[arg(long = "platform")]
    pub platforms: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct CompanyArgs {
    #[command(subcommand)]
    pub action: CompanyCmd,
}

#[derive(Subcommand, Debug)]
pub enum CompanyCmd {
    /// Show the company profile
    Show,
    /// Create or update the company profile; omitted fields keep their value
    Save {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        postal_code: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        address_detail: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Parser, Debug)]
pub struct ContactsArgs {
    #[command(subcommand)]
    pub action: ContactsCmd,
}

#[derive(Subcommand, Debug)]
pub enum ContactsCmd {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
    Get { id: i64 },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StatusArg {
    Draft,
    Active,
    Inactive,
    All,
}

impl StatusArg {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::All => "all",
        }
    }
}

impl fmt::Display for StatusArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<StatusArg> for StatusFilter {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Draft => StatusFilter::Draft,
            StatusArg::Active => StatusFilter::Active,
            StatusArg::Inactive => StatusFilter::Inactive,
            StatusArg::All => StatusFilter::All,
        }
    }
}
