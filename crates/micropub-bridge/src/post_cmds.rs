use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mpb_content::FormFields;
use mpb_core::Published;
use mpb_publish::CreateRequest;
use serde_json::Value;

use crate::App;
use crate::cli::OutputFormat;
use crate::media_cmds::read_media_file;

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Build a flat form from `--field` and `--file` pairs.
///
/// `h=entry` is assumed when no `h` field is given.
pub(crate) fn build_form(fields: &[(String, String)], files: &[(String, String)]) -> Result<FormFields> {
    let mut form = FormFields::new();
    if !fields.iter().any(|(key, _)| key == "h") {
        form.push_text("h", "entry");
    }
    for (key, value) in fields {
        form.push_text(key.as_str(), value.as_str());
    }
    for (key, path) in files {
        form.push_file(key.as_str(), read_media_file(Path::new(path))?);
    }
    Ok(form)
}

fn print_published(url: &str, published: &Published, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "url": url, "filename": published.filename })
        ),
        OutputFormat::Text => println!("{url}"),
    }
}

pub(crate) async fn handle_create(
    app: &App,
    json: Option<PathBuf>,
    fields: Vec<(String, String)>,
    files: Vec<(String, String)>,
    client_id: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let request = match json {
        Some(path) => CreateRequest::Structured(read_json(&path)?),
        None => CreateRequest::Form(build_form(&fields, &files)?),
    };
    let published = app.add_content(&request, client_id.as_deref()).await?;
    let url = app.config().site.public_url(&published.filename);
    print_published(&url, &published, format);
    Ok(())
}

pub(crate) async fn handle_update(
    app: &App,
    url: String,
    patch: PathBuf,
    format: OutputFormat,
) -> Result<()> {
    let request = read_json(&patch)?;
    let published = app.update_from_request(&url, &request).await?;
    print_published(&url, &published, format);
    Ok(())
}

pub(crate) async fn handle_delete(
    app: &App,
    url: String,
    permanent: bool,
    format: OutputFormat,
) -> Result<()> {
    let published = if permanent {
        app.delete_content(&url, true).await?
    } else {
        app.delete(&url).await?
    };
    print_published(&url, &published, format);
    Ok(())
}

pub(crate) async fn handle_undelete(app: &App, url: String, format: OutputFormat) -> Result<()> {
    let published = app.undelete_content(&url).await?;
    print_published(&url, &published, format);
    Ok(())
}

pub(crate) async fn handle_source(app: &App, url: String, properties: Vec<String>) -> Result<()> {
    let filter = (!properties.is_empty()).then_some(properties.as_slice());
    let source = app.source(&url, filter).await?;
    println!("{}", serde_json::to_string_pretty(&source)?);
    Ok(())
}
