use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: usize = 10;

/// Paging for the media listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl Default for MediaQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
}

/// One page of uploaded media, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaList {
    pub items: Vec<MediaItem>,
    /// Items on this page.
    pub count: usize,
    /// Files in the media directory.
    pub total: usize,
}

impl MediaList {
    /// Sort URLs descending and cut out one page.
    pub(crate) fn page(mut urls: Vec<String>, query: MediaQuery) -> Self {
        let total = urls.len();
        urls.sort_unstable_by(|a, b| b.cmp(a));
        let items: Vec<MediaItem> = urls
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(|url| MediaItem { url })
            .collect();
        Self {
            count: items.len(),
            items,
            total,
        }
    }
}
