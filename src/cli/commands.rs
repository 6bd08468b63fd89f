use std::path::Path;

use tracing::{info, warn};

use crate::aggregate::RunReport;
use crate::app::{AppContext, AppError, Result, Shutdown};
use crate::config::{ConfigError, Rules};
use crate::export;
use crate::friends::fetch_friends_page;

/// Load theme presets. A missing rules file only disables friends pages.
pub fn load_rules(path: &Path) -> Result<Rules> {
    match Rules::load(path) {
        Ok(rules) => Ok(rules),
        Err(ConfigError::Io { path, source }) if source.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Rules file not found, friends pages will be skipped");
            Ok(Rules::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// One full aggregation. In simple mode the in-memory results are exported
/// to `export_path` afterwards.
pub async fn run(ctx: &AppContext, export_path: &Path, shutdown: Shutdown) -> Result<RunReport> {
    if ctx.config.reset_on_start {
        match ctx.sink.reset() {
            Ok(()) => info!("Cleared stored friends and posts"),
            Err(e) => warn!(error = %e, "Failed to reset store"),
        }
        if let Err(e) = export::remove(export_path) {
            warn!(path = %export_path.display(), error = %e, "Failed to remove previous export");
        }
    }

    let roster = ctx.roster().await;
    if shutdown.is_cancelled() {
        warn!("Interrupted while reading friends pages");
        return Err(AppError::Cancelled);
    }
    if roster.is_empty() {
        warn!("No friends configured or found");
    }

    let report = ctx.aggregator().run(roster.into_entries(), shutdown).await?;

    if ctx.config.simple_mode {
        export::write_json(export_path, &ctx.sink.export_snapshot()?)?;
    }

    println!(
        "Processed {} friends: {} ok, {} failed, {} posts, {} expired",
        report.friends, report.succeeded, report.failed, report.posts, report.expired
    );
    Ok(report)
}

/// Print the friends found on each configured friends page.
pub async fn discover(ctx: &AppContext) -> Result<usize> {
    let mut total = 0;

    for source in ctx.config.page_sources() {
        let Some(preset) = ctx.rules.preset(&source.theme) else {
            warn!(url = %source.url, theme = %source.theme, "No rule preset for friends page");
            continue;
        };

        match fetch_friends_page(ctx.fetcher.as_ref(), &source.url, preset).await {
            Ok(found) if found.is_empty() => {
                warn!(url = %source.url, theme = %source.theme, "No friends found on page");
            }
            Ok(found) => {
                println!("{} ({} friends)", source.url, found.len());
                for friend in &found {
                    println!("  {}\t{}\t{}", friend.name, friend.link, friend.avatar);
                }
                total += found.len();
            }
            Err(e) => warn!(url = %source.url, error = %e, "Failed to read friends page"),
        }
    }

    Ok(total)
}

/// Write the database's current snapshot to `path`.
///
/// Refused in simple mode: the in-memory sink starts empty, and `run`
/// already writes the export there.
pub fn export(ctx: &AppContext, path: &Path) -> Result<()> {
    if ctx.config.simple_mode {
        return Err(AppError::Config(
            "export reads the database and is unavailable with SIMPLE_MODE; `run` writes the export itself".into(),
        ));
    }

    let snapshot = ctx.sink.export_snapshot()?;
    export::write_json(path, &snapshot)?;
    println!(
        "Exported {} friends and {} posts to {}",
        snapshot.stats.friends_total,
        snapshot.stats.posts_total,
        path.display()
    );
    Ok(())
}

pub async fn find(ctx: &AppContext, site: &str, suffix: &str) -> Result<String> {
    let feed = ctx.discovery.discover(site, suffix).await?;
    println!("{}", feed);
    Ok(feed)
}
