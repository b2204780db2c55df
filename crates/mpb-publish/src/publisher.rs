//! Request orchestration: normalize, enrich, format, persist.
//!
//! Every operation resolves to `Result<_, PublishError>`. Store and network
//! failures are logged here and mapped to the error taxonomy; enrichment
//! failures (title lookup, photo upload) are logged and dropped.

use mpb_config::BridgeConfig;
use mpb_content::{
    Patch, TitleFetcher, apply_patch, fetch_linked_title, format, from_persisted_text,
    media_filename, to_external_properties, url_to_filename,
};
use mpb_core::{Entry, MediaFile, Photo, PublishError, Published};
use mpb_store::{FileStore, StoredFile};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::media::{MediaList, MediaQuery};
use crate::request::CreateRequest;

pub struct Publisher<S, T> {
    config: BridgeConfig,
    store: S,
    titles: T,
}

impl<S: FileStore, T: TitleFetcher> Publisher<S, T> {
    pub fn new(config: BridgeConfig, store: S, titles: T) -> Self {
        Self {
            config,
            store,
            titles,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a post. Returns its public slug (`{kind}/{slug}`).
    pub async fn add_content(
        &self,
        request: &CreateRequest,
        client_id: Option<&str>,
    ) -> Result<Published, PublishError> {
        let mut entry = request.to_entry().ok_or_else(PublishError::nothing_to_add)?;
        if !self.config.publish.unknown_properties.keeps_unknown() {
            entry.strip_unknown();
        }
        if let Some(client_id) = client_id.filter(|id| !id.is_empty()) {
            entry.client_id = Some(client_id.to_string());
        }

        self.name_like(&mut entry).await;
        self.attach_photos(&mut entry).await;

        if !entry.is_meaningful() {
            return Err(PublishError::nothing_to_add());
        }

        let formatted = format(&entry, &self.config.site)?;
        if self.load(&formatted.filename).await?.is_some() {
            return Err(PublishError::file_exists());
        }
        self.store
            .create_file(&formatted.filename, &formatted.formatted)
            .await
            .map_err(|error| {
                warn!(path = %formatted.filename, error = %format!("{error:#}"), "create failed");
                PublishError::cannot_create()
            })?;
        info!(path = %formatted.filename, kind = %formatted.kind, "created post");
        Ok(Published {
            filename: formatted.slug,
        })
    }

    /// Apply a patch to the post at `url`. Returns its storage path.
    pub async fn update_content(&self, url: &str, patch: &Patch) -> Result<Published, PublishError> {
        let (filename, existing) = self.load_post(url).await?;
        let entry = from_persisted_text(&existing.content)?;
        let patched = apply_patch(patch, &entry, self.config.publish.unknown_properties)
            .ok_or_else(PublishError::nothing_to_update)?;
        let formatted = format(&patched, &self.config.site)?;

        // The version captured at load time must reach the write unchanged.
        self.store
            .update_file(&filename, &formatted.formatted, &existing)
            .await
            .map_err(|error| {
                warn!(path = %filename, error = %format!("{error:#}"), "update failed");
                PublishError::cannot_update()
            })?;
        info!(path = %filename, verb = patch.verb(), "updated post");
        Ok(Published { filename })
    }

    /// Update from a raw request body carrying one verb.
    pub async fn update_from_request(
        &self,
        url: &str,
        request: &Value,
    ) -> Result<Published, PublishError> {
        match Patch::from_request(request)? {
            Some(patch) => self.update_content(url, &patch).await,
            None => Err(PublishError::nothing_to_update()),
        }
    }

    /// Tombstone the post, or remove its file when `permanent`.
    pub async fn delete_content(&self, url: &str, permanent: bool) -> Result<Published, PublishError> {
        if !permanent {
            return self.update_content(url, &Patch::add_tombstone()).await;
        }
        let (filename, existing) = self.load_post(url).await?;
        self.store
            .delete_file(&filename, &existing)
            .await
            .map_err(|error| {
                warn!(path = %filename, error = %format!("{error:#}"), "delete failed");
                PublishError::cannot_delete()
            })?;
        info!(path = %filename, "deleted post");
        Ok(Published { filename })
    }

    /// Delete using the configured mode.
    pub async fn delete(&self, url: &str) -> Result<Published, PublishError> {
        self.delete_content(url, self.config.publish.permanent_delete)
            .await
    }

    /// Clear the tombstone. Fails if the file was removed permanently.
    pub async fn undelete_content(&self, url: &str) -> Result<Published, PublishError> {
        self.update_content(url, &Patch::remove_tombstone()).await
    }

    /// `q=source`: the stored post in structured form.
    pub async fn source(
        &self,
        url: &str,
        properties: Option<&[String]>,
    ) -> Result<Value, PublishError> {
        let (_, existing) = self.load_post(url).await?;
        let entry = from_persisted_text(&existing.content)?;
        Ok(to_external_properties(&entry, properties))
    }

    /// Store one upload under the media directory. Returns its public URL.
    pub async fn upload_media(&self, file: &MediaFile) -> Result<String, PublishError> {
        if media_filename(file, &self.config.site).is_none() {
            return Err(PublishError::invalid_file());
        }
        let path = self
            .store_media(file)
            .await
            .ok_or_else(PublishError::cannot_upload)?;
        Ok(self.config.site.public_url(&path))
    }

    /// List uploads, newest first.
    pub async fn list_media(&self, query: MediaQuery) -> Result<MediaList, PublishError> {
        let dir = &self.config.site.media_dir;
        let files = match self.store.get_directory(dir).await {
            Ok(Some(files)) => files,
            Ok(None) => return Err(PublishError::directory_missing()),
            Err(error) => {
                warn!(path = %dir, error = %format!("{error:#}"), "listing failed");
                return Err(PublishError::directory_missing());
            }
        };
        let urls = files
            .iter()
            .map(|file| self.config.site.public_url(&file.path))
            .collect();
        Ok(MediaList::page(urls, query))
    }

    /// `q=config`: supported queries and the media endpoint.
    pub fn config_query(&self) -> Value {
        let mut config = json!({ "q": ["config", "source"] });
        if let Some(endpoint) = &self.config.site.media_endpoint {
            config["media-endpoint"] = Value::String(endpoint.clone());
        }
        config
    }

    async fn load(&self, path: &str) -> Result<Option<StoredFile>, PublishError> {
        self.store.get_file(path).await.map_err(|error| {
            warn!(path, error = %format!("{error:#}"), "read failed");
            PublishError::Storage("file cannot be read".into())
        })
    }

    async fn load_post(&self, url: &str) -> Result<(String, StoredFile), PublishError> {
        let filename =
            url_to_filename(url, &self.config.site).ok_or_else(PublishError::invalid_url)?;
        let existing = self
            .load(&filename)
            .await?
            .ok_or_else(PublishError::file_missing)?;
        debug!(path = %filename, version = %existing.version, "loaded post");
        Ok((filename, existing))
    }

    /// Name an untitled like after the page it likes.
    async fn name_like(&self, entry: &mut Entry) {
        if !self.config.publish.fetch_like_titles || entry.name.is_some() {
            return;
        }
        let Some(like_of) = entry.like_of.clone() else {
            return;
        };
        entry.name = fetch_linked_title(&self.titles, &like_of).await;
    }

    async fn store_media(&self, file: &MediaFile) -> Option<String> {
        let Some(path) = media_filename(file, &self.config.site) else {
            warn!(filename = %file.filename, "upload has no usable filename");
            return None;
        };
        match self.store.upload_media(&path, file).await {
            Ok(stored) => {
                info!(path = %stored, bytes = file.content.len(), "uploaded media");
                Some(stored)
            }
            Err(error) => {
                warn!(path = %path, error = %format!("{error:#}"), "upload failed");
                None
            }
        }
    }

    /// Upload attached files in order and reference every photo from the
    /// body. Failed uploads are dropped.
    async fn attach_photos(&self, entry: &mut Entry) {
        let mut attached = Vec::with_capacity(entry.photo.len());
        for photo in std::mem::take(&mut entry.photo) {
            match photo {
                Photo::Link { .. } => attached.push(photo),
                Photo::Upload { file, alt } => {
                    if let Some(value) = self.store_media(&file).await {
                        attached.push(Photo::Link { value, alt });
                    }
                }
            }
        }

        for photo in &attached {
            let Photo::Link { value, alt } = photo else {
                continue;
            };
            let target = if value.contains("://") {
                value.clone()
            } else {
                format!("/{}", value.trim_start_matches('/'))
            };
            let body = entry.content.take().unwrap_or_default();
            entry.content = Some(format!(
                "![{}]({target})\n\n{body}",
                alt.as_deref().unwrap_or_default()
            ));
        }
        entry.photo = attached;
    }
}

#[cfg(test)]
#[path = "publisher_tests.rs"]
mod tests;
