use std::path::Path;

use anyhow::{Context, Result};
use mpb_core::MediaFile;
use mpb_publish::MediaQuery;

use crate::App;
use crate::cli::OutputFormat;

/// Read a file from disk into an upload, guessing its content type.
pub(crate) fn read_media_file(path: &Path) -> Result<MediaFile> {
    let content =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(MediaFile {
        content_type: guess_content_type(&filename).map(str::to_string),
        filename,
        content,
    })
}

fn guess_content_type(filename: &str) -> Option<&'static str> {
    let (_, ext) = filename.rsplit_once('.')?;
    let mime = match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime)
}

pub(crate) async fn handle_media_upload(app: &App, path: &Path, format: OutputFormat) -> Result<()> {
    let file = read_media_file(path)?;
    let url = app.upload_media(&file).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "url": url })),
        OutputFormat::Text => println!("{url}"),
    }
    Ok(())
}

pub(crate) async fn handle_media_list(
    app: &App,
    limit: usize,
    offset: usize,
    format: OutputFormat,
) -> Result<()> {
    let list = app.list_media(MediaQuery { limit, offset }).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&list)?),
        OutputFormat::Text => {
            for item in &list.items {
                println!("{}", item.url);
            }
            eprintln!("{} of {} file(s)", list.count, list.total);
        }
    }
    Ok(())
}
