// src/work/builtin.rs

//! Filesystem work units available by name from the config file.
//!
//! The filesystem units take a `path` argument and the writers also take
//! `content`. `fetch_url` takes `url`.

use std::sync::Arc;

use anyhow::Context;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use super::{AsyncFnWork, WorkArgs, WorkUnit, required_arg};

pub const CREATE_DIR: &str = "create_dir";
pub const REMOVE_DIR: &str = "remove_dir";
pub const CREATE_FILE: &str = "create_file";
pub const WRITE_FILE: &str = "write_file";
pub const READ_FILE: &str = "read_file";
pub const APPEND_FILE: &str = "append_file";
pub const REMOVE_FILE: &str = "remove_file";
pub const FETCH_URL: &str = "fetch_url";

/// Characters of a fetched body that are logged.
pub const PREVIEW_CHARS: usize = 100;

/// All built-in work units except `shell`.
pub fn builtins() -> Vec<Arc<dyn WorkUnit>> {
    vec![
        Arc::new(AsyncFnWork::new(CREATE_DIR, create_dir)),
        Arc::new(AsyncFnWork::new(REMOVE_DIR, remove_dir)),
        Arc::new(AsyncFnWork::new(CREATE_FILE, create_file)),
        Arc::new(AsyncFnWork::new(WRITE_FILE, write_file)),
        Arc::new(AsyncFnWork::new(READ_FILE, read_file)),
        Arc::new(AsyncFnWork::new(APPEND_FILE, append_file)),
        Arc::new(AsyncFnWork::new(REMOVE_FILE, remove_file)),
        Arc::new(AsyncFnWork::new(FETCH_URL, fetch_url)),
    ]
}

/// Create a directory; succeeds if it already exists.
async fn create_dir(args: WorkArgs) -> anyhow::Result<()> {
    let path = required_arg(&args, "path")?;
    fs::create_dir_all(path)
        .await
        .with_context(|| format!("creating directory {path:?}"))?;
    info!(path = %path, "directory created");
    Ok(())
}

/// Remove an empty directory.
async fn remove_dir(args: WorkArgs) -> anyhow::Result<()> {
    let path = required_arg(&args, "path")?;
    fs::remove_dir(path)
        .await
        .with_context(|| format!("removing directory {path:?}"))?;
    info!(path = %path, "directory removed");
    Ok(())
}

/// Create (or truncate) an empty file.
async fn create_file(args: WorkArgs) -> anyhow::Result<()> {
    let path = required_arg(&args, "path")?;
    fs::write(path, b"")
        .await
        .with_context(|| format!("creating file {path:?}"))?;
    info!(path = %path, "file created");
    Ok(())
}

async fn write_file(args: WorkArgs) -> anyhow::Result<()> {
    let path = required_arg(&args, "path")?;
    let content = required_arg(&args, "content")?;
    fs::write(path, content.as_bytes())
        .await
        .with_context(|| format!("writing file {path:?}"))?;
    info!(path = %path, content = %content, "file written");
    Ok(())
}

async fn read_file(args: WorkArgs) -> anyhow::Result<()> {
    let path = required_arg(&args, "path")?;
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading file {path:?}"))?;
    info!(path = %path, content = %content, "file read");
    Ok(())
}

async fn append_file(args: WorkArgs) -> anyhow::Result<()> {
    let path = required_arg(&args, "path")?;
    let content = required_arg(&args, "content")?;
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("opening file {path:?} for append"))?;
    file.write_all(content.as_bytes())
        .await
        .with_context(|| format!("appending to file {path:?}"))?;
    file.flush().await?;
    info!(path = %path, content = %content, "content appended");
    Ok(())
}

async fn remove_file(args: WorkArgs) -> anyhow::Result<()> {
    let path = required_arg(&args, "path")?;
    fs::remove_file(path)
        .await
        .with_context(|| format!("removing file {path:?}"))?;
    info!(path = %path, "file removed");
    Ok(())
}

/// GET `url`. A `200` logs the start of the body; any other status is logged
/// as a warning but does not fail the job. Transport errors fail it.
async fn fetch_url(args: WorkArgs) -> anyhow::Result<()> {
    let url = required_arg(&args, "url")?;
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("requesting {url}"))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        warn!(url = %url, status = status.as_u16(), "unsuccessful request");
        return Ok(());
    }

    let body = response
        .text()
        .await
        .with_context(|| format!("reading body of {url}"))?;
    info!(url = %url, data = %preview(&body), "fetched url");
    Ok(())
}

/// The first [`PREVIEW_CHARS`] characters of `text`.
pub fn preview(text: &str) -> &str {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
