//! Command handlers containing the business logic for each subcommand.

use stencil::installer::{keys, InstallRequest, ManagedSource, PackageSource};

use super::traits::CommandContext;
use crate::error::CliError;

/// Handle `stencil install`.
pub async fn install(
    identifier: String,
    version: Option<String>,
    feeds: Vec<String>,
    ctx: &CommandContext<'_>,
) -> Result<(), CliError> {
    let mut request = InstallRequest::new(&identifier);
    if let Some(version) = version {
        request = request.with_version(version);
    }
    if !feeds.is_empty() {
        request = request.with_detail(
            keys::FEED_SOURCES,
            feeds.join(&keys::FEED_SOURCE_SEPARATOR.to_string()),
        );
    }

    let source = ctx.installer.install(request, &ctx.cancel).await?;
    ctx.registry
        .upsert(ctx.installer.serialize(&PackageSource::Archive(source.clone())))?;

    ctx.output.println(&format!(
        "Installed {} v{}",
        source.identifier(),
        version_label(&source)
    ));
    Ok(())
}

/// Handle `stencil remove`.
pub async fn remove(identifier: String, ctx: &CommandContext<'_>) -> Result<(), CliError> {
    let source = find_installed(ctx, &identifier)?;

    ctx.installer.uninstall(&source, &ctx.cancel).await?;
    ctx.registry.remove(source.mount_point_uri())?;

    ctx.output.println(&format!("Removed {}", identifier));
    Ok(())
}

/// Handle `stencil update`.
///
/// Without an explicit target version, the latest version reported by
/// the feed is used; an already-current package is left alone.
pub async fn update(
    identifier: String,
    version: Option<String>,
    ctx: &CommandContext<'_>,
) -> Result<(), CliError> {
    let source = find_installed(ctx, &identifier)?;

    let target = match version {
        Some(version) => version,
        None => {
            let results = ctx
                .installer
                .check_updates(std::slice::from_ref(&source), &ctx.cancel)
                .await;
            let check = results
                .into_iter()
                .next()
                .expect("one result per source")?;

            if check.is_latest {
                ctx.output.println(&format!(
                    "{} is already at the latest version (v{})",
                    identifier, check.latest
                ));
                return Ok(());
            }
            check.latest.to_string()
        }
    };

    let old_mount = source.mount_point_uri().to_string();
    let updated = ctx.installer.update(&source, &target, &ctx.cancel).await?;

    ctx.registry.remove(&old_mount)?;
    ctx.registry
        .upsert(ctx.installer.serialize(&PackageSource::Archive(updated.clone())))?;

    ctx.output
        .println(&format!("Updated {} to v{}", updated.identifier(), target));
    Ok(())
}

/// Handle `stencil check`.
pub async fn check(ctx: &CommandContext<'_>) -> Result<(), CliError> {
    let records = ctx.registry.load()?;
    if records.is_empty() {
        ctx.output.println("No template packages installed.");
        return Ok(());
    }

    ctx.output.println("Checking for package updates...");
    ctx.output.newline();

    let sources: Vec<PackageSource> = records
        .into_iter()
        .map(|record| ctx.installer.deserialize(record))
        .collect();
    let results = ctx.installer.check_updates(&sources, &ctx.cancel).await;

    let mut updates_available = 0;
    for (source, result) in sources.iter().zip(results) {
        match result {
            Ok(check) if check.is_latest => {
                ctx.output.indented(&format!(
                    "{} v{} - up to date",
                    check.identifier, check.installed
                ));
            }
            Ok(check) => {
                ctx.output.indented(&format!(
                    "{} v{} -> v{} - update available",
                    check.identifier, check.installed, check.latest
                ));
                updates_available += 1;
            }
            Err(e) => {
                ctx.output
                    .indented(&format!("{} - check failed: {}", source.mount_point_uri(), e));
            }
        }
    }

    ctx.output.newline();
    if updates_available > 0 {
        ctx.output.println(&format!(
            "{} update(s) available. Use 'stencil update <identifier>' to apply.",
            updates_available
        ));
    } else {
        ctx.output.println("All packages are up to date.");
    }
    Ok(())
}

/// Handle `stencil list`.
pub fn list(verbose: bool, ctx: &CommandContext<'_>) -> Result<(), CliError> {
    let records = ctx.registry.load()?;
    if records.is_empty() {
        ctx.output.println("No template packages installed.");
        ctx.output.newline();
        ctx.output
            .println("Use 'stencil install' to install packages.");
        return Ok(());
    }

    ctx.output
        .header(&format!("Installed Packages ({})", records.len()));
    ctx.output.newline();

    for record in records {
        match ctx.installer.deserialize(record) {
            PackageSource::Archive(source) => {
                let origin = if source.is_local() {
                    "local archive".to_string()
                } else {
                    source.feed_uri().unwrap_or("unknown feed").to_string()
                };

                if verbose {
                    ctx.output
                        .println(&format!("{} v{}", source.identifier(), version_label(&source)));
                    ctx.output.indented(&format!("Origin: {}", origin));
                    if let Some(author) = source.author() {
                        ctx.output.indented(&format!("Author: {}", author));
                    }
                    ctx.output
                        .indented(&format!("Path: {}", source.mount_point_uri()));
                    ctx.output.indented(&format!(
                        "Installed: {}",
                        source.last_change_time().format("%Y-%m-%d %H:%M:%S UTC")
                    ));
                    ctx.output.newline();
                } else {
                    ctx.output.indented(&format!(
                        "{} v{} ({})",
                        source.identifier(),
                        version_label(&source),
                        origin
                    ));
                }
            }
            PackageSource::Foreign(foreign) => {
                ctx.output.indented(&format!(
                    "{} (managed by installer {})",
                    foreign.mount_point_uri, foreign.installer_id
                ));
            }
        }
    }

    if !verbose {
        ctx.output.newline();
        ctx.output.println("Use --verbose for more details.");
    }
    Ok(())
}

/// Find an installed source by identifier, case-insensitively.
fn find_installed(ctx: &CommandContext<'_>, identifier: &str) -> Result<PackageSource, CliError> {
    let records = ctx.registry.load()?;

    for record in records {
        if let PackageSource::Archive(source) = ctx.installer.deserialize(record) {
            if source.identifier().eq_ignore_ascii_case(identifier) {
                return Ok(PackageSource::Archive(source));
            }
        }
    }

    Err(CliError::NotInstalled(identifier.to_string()))
}

fn version_label(source: &ManagedSource) -> String {
    source
        .version()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "?".to_string())
}
