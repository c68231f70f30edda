use anyhow::{Context, Result};
use cfml_lens_core::FileUpdate;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tracing::{debug, warn};

use super::directory_or_cwd;
use crate::cli::GlobalOptions;
use crate::workspace::Workspace;

fn build_watcher(tx: mpsc::Sender<notify::Result<notify::Event>>) -> notify::Result<RecommendedWatcher> {
    notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .map(|mut watcher| {
        watcher
            .configure(Config::default().with_poll_interval(Duration::from_millis(200)))
            .ok();
        watcher
    })
}

/// Apply one changed path to the workspace and report what happened
fn apply_change(workspace: &mut Workspace, path: &Path, json: bool) {
    let update = if path.exists() {
        match workspace.update_file(path) {
            Ok(update) => update,
            Err(err) => {
                warn!("{:#}", err);
                return;
            }
        }
    } else {
        workspace.remove_file(path)
    };

    let label = match update {
        FileUpdate::Updated => "updated",
        FileUpdate::Removed => "removed",
        FileUpdate::Unchanged | FileUpdate::Ignored => {
            debug!("{:?}: {}", update, path.display());
            return;
        }
    };

    if json {
        println!(
            "{}",
            serde_json::json!({ "event": label, "path": path, "components": workspace.cache().len() })
        );
    } else {
        println!("🔄 {} {} ({} components)", label, path.display(), workspace.cache().len());
    }
}

pub fn watch_command(path: Option<&Path>, options: &GlobalOptions) -> Result<()> {
    let start = directory_or_cwd(path)?;
    let mut workspace = Workspace::open(&start, options.root.as_deref())?;
    let stats = workspace.index()?;
    let root: PathBuf = workspace.root().to_path_buf();

    let (tx, rx) = mpsc::channel();
    let mut watcher = build_watcher(tx).context("Failed to create file watcher")?;
    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", root.display()))?;

    if !options.json {
        println!(
            "👀 Watching {} ({} components indexed). Press Ctrl+C to stop…",
            root.display(),
            stats.components
        );
    }

    for event in rx {
        match event {
            Ok(event) => {
                if !matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                ) {
                    continue;
                }
                for path in &event.paths {
                    apply_change(&mut workspace, path, options.json);
                }
            }
            Err(err) => warn!("watch error: {}", err),
        }
    }

    Ok(())
}
