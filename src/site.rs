use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use chrono::Utc;

use crate::builtin;
use crate::html::{self, Links, file_safe_id};
use crate::load::{self, Loader, Trigger, Viewer};
use crate::progress::Progress;
use crate::store::TableClient;

/// Fetches everything once and writes `index.html`, one page per community
/// and the stylesheet into `out_dir`.
pub async fn render_dir<C: TableClient>(
    client: &C,
    viewer: &Viewer,
    out_dir: &Path,
    progress: Arc<Progress>,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;
    let now = Utc::now();

    progress.set_stage("fetching topics and communities");
    let feed_view = Loader::new("feed");
    let directory_view = Loader::new("directory");
    let (feed, directory) = tokio::join!(
        load::load_feed(&feed_view, Trigger::Open, client, now),
        load::load_directory(&directory_view, Trigger::Open, client, viewer),
    );

    let mut ids: Vec<String> = Vec::new();
    if let Some(dir) = directory.content() {
        let linked = dir
            .communities
            .iter()
            .map(|c| &c.id)
            .chain(dir.sidebar.iter().map(|e| &e.community_id));
        for id in linked {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
    }
    progress.set_pages_total(ids.len() + 1);

    progress.set_stage("writing pages");
    write_file(
        &out_dir.join(Links::Static.home()),
        &html::build_home(&feed, &directory, Links::Static),
    )?;
    progress.page_done("index");

    let community_view = Loader::new("community");
    for id in &ids {
        let state =
            load::load_community_page(&community_view, Trigger::Open, client, id, viewer, now).await;
        let page = html::build_community(&state, id, Links::Static);
        write_file(&out_dir.join(Links::Static.community(id)), &page)?;
        progress.page_done(&format!("community {}", file_safe_id(id)));
    }

    write_file(&out_dir.join(Links::Static.stylesheet()), builtin::SITE_CSS)?;
    tracing::info!(
        out = %out_dir.display(),
        pages = ids.len() + 1,
        topics = feed.content().map(|f| f.len()).unwrap_or(0),
        "site written"
    );
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}
