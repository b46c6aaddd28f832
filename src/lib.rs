mod bucket;
mod builtin;
mod cli;
mod config;
mod fallback;
mod html;
mod load;
mod model;
mod progress;
mod rest;
mod row;
mod server;
mod site;
mod store;
mod transform;

use std::path::PathBuf;

use cli::Args;
use config::{Backend, StoreConfig};
use load::Viewer;

pub use cli::ProgressMode;
pub use cli::{Args as CliArgs, Mode};

pub async fn run(args: Args) -> anyhow::Result<()> {
    use std::io::IsTerminal as _;

    let progress_enabled = matches!(args.mode, Mode::Dir)
        && match args.progress {
            ProgressMode::Always => true,
            ProgressMode::Never => false,
            ProgressMode::Auto => std::io::stderr().is_terminal(),
        };
    let progress = progress::Progress::new(progress_enabled);
    progress.set_stage("connecting to store");

    let backend = Backend::from_config(&StoreConfig::from_args(&args), Some(progress.clone()))?;

    let res = match args.mode {
        Mode::Dir => {
            let out_dir = args.out.clone().unwrap_or_else(|| PathBuf::from("out"));
            let viewer = Viewer {
                user_id: args.user_id.clone(),
                ..Viewer::default()
            };
            site::render_dir(&backend, &viewer, &out_dir, progress.clone()).await
        }
        Mode::Serve => server::serve(app_state(&args, backend), &args.listen).await,
    };
    progress.finish();
    res
}

fn app_state(args: &Args, backend: Backend) -> server::AppState {
    server::AppState::new(backend, args.user_id.clone(), args.write_joins)
}

/// Builds the live-mode router without binding a socket.
pub fn router(args: &Args) -> anyhow::Result<axum::Router> {
    let backend = Backend::from_config(&StoreConfig::from_args(args), None)?;
    Ok(server::router(app_state(args, backend)))
}
