//! Save, share and file commands

use anyhow::Context;
use std::path::Path;

use super::Workspace;

pub async fn save(ws: &Workspace) -> anyhow::Result<()> {
    ws.service.save().await?;
    Ok(())
}

pub fn share(ws: &Workspace) -> anyhow::Result<()> {
    let url = ws.service.share_url()?;
    println!("{}", url);
    Ok(())
}

/// Loaded forms become the working form, so they are saved straight away
pub async fn open(ws: &Workspace, url: &str) -> anyhow::Result<()> {
    match ws.service.open_shared(url)? {
        Some(cleaned) => println!("{}", cleaned),
        None => anyhow::bail!("no form in {}", url),
    }
    ws.service.save().await?;
    Ok(())
}

pub async fn export(ws: &Workspace) -> anyhow::Result<()> {
    let location = ws.service.export().await?;
    println!("{}", location);
    Ok(())
}

pub async fn import(ws: &Workspace, file: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    ws.service.import(&text)?;
    ws.service.save().await?;
    Ok(())
}

pub async fn clear(ws: &Workspace) -> anyhow::Result<()> {
    ws.service.reset().await?;
    Ok(())
}
