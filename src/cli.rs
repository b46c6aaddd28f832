use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use url::Url;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Mode {
    /// Fetch once and write the pages into a directory.
    Dir,
    /// Serve the pages over HTTP, fetching on every request.
    Serve,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgressMode {
    /// Enable progress UI when stderr is a TTY.
    Auto,
    /// Always enable progress UI (even when piped).
    Always,
    /// Never show progress UI.
    Never,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Base URL of the hosted table store (e.g. `https://xyz.supabase.co`).
    ///
    /// Without a URL and key the tool runs against an empty offline store.
    #[arg(long, env = "SUPABASE_URL")]
    pub store_url: Option<Url>,

    /// Anonymous API key for the table store.
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub store_key: Option<String>,

    /// User whose community memberships fill the sidebar.
    #[arg(long, env = "FORUMHUB_USER_ID")]
    pub user_id: Option<String>,

    /// Output mode: `dir` (static pages) or `serve` (live HTTP server).
    #[arg(long, value_enum, default_value = "dir")]
    pub mode: Mode,

    /// Output directory for `dir` mode.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Address to listen on in `serve` mode.
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub listen: String,

    /// Also record joins as `community_memberships` rows (needs `--user-id`).
    #[arg(long)]
    pub write_joins: bool,

    /// HTTP User-Agent used for store requests.
    #[arg(long, default_value = "forumhub-render/0.1")]
    pub user_agent: String,

    /// Progress display: `auto`, `always`, or `never`.
    #[arg(long, value_enum, default_value = "auto")]
    pub progress: ProgressMode,
}
