use mpb_config::SiteConfig;
use tracing::debug;
use url::Url;

/// Map a public post URL to its storage path under the content directory.
///
/// `None` for malformed URLs, foreign origins, and the site root.
pub fn url_to_filename(raw: &str, site: &SiteConfig) -> Option<String> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(error) => {
            debug!(url = raw, %error, "invalid post url");
            return None;
        }
    };
    if url.origin().ascii_serialization() != site.origin() {
        debug!(url = raw, me = %site.me, "post url outside site origin");
        return None;
    }
    let path = url.path().trim_matches('/');
    if path.is_empty() {
        return None;
    }
    Some(format!("{}/{path}.md", site.content_dir))
}
