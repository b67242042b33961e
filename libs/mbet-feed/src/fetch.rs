//! HTTP retrieval of the two feed documents.

use std::time::Duration;

use tracing::debug;

use crate::directory::Directory;
use crate::model::Feed;
use crate::{parser, Result};

/// Which of the two upstream documents to request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedKind {
    PreMatch,
    Live,
}

impl FeedKind {
    /// Path token the upstream wrapper expects.
    pub fn code(self) -> &'static str {
        match self {
            FeedKind::PreMatch => "pre",
            FeedKind::Live => "liv",
        }
    }
}

/// Client for the upstream feed endpoint.
///
/// The configured URL carries a `{kind}` placeholder which is replaced
/// with the [`FeedKind`] code on every request.
pub struct FeedClient {
    url_template: String,
    client: reqwest::Client,
}

impl FeedClient {
    pub fn new(url_template: impl Into<String>) -> Result<FeedClient> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(FeedClient {
            url_template: url_template.into(),
            client,
        })
    }

    /// Fetch one document and parse it against `directory`.
    pub async fn get(&self, kind: FeedKind, directory: &dyn Directory) -> Result<Feed> {
        let xml = self.fetch(kind).await?;
        parser::parse(&xml, directory).await
    }

    /// Fetch the raw markup for one document.
    pub async fn fetch(&self, kind: FeedKind) -> Result<String> {
        let url = self.url_for(kind);
        debug!(%url, "fetching feed");
        let response = self.client.get(&url).send().await?;
        Ok(response.error_for_status()?.text().await?)
    }

    fn url_for(&self, kind: FeedKind) -> String {
        self.url_template.replace("{kind}", kind.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_codes() {
        assert_eq!(FeedKind::PreMatch.code(), "pre");
        assert_eq!(FeedKind::Live.code(), "liv");
    }

    #[test]
    fn template_substitution() {
        let client = FeedClient::new("https://feed.example.com/xml/{kind}").unwrap();
        assert_eq!(
            client.url_for(FeedKind::Live),
            "https://feed.example.com/xml/liv"
        );
        assert_eq!(
            client.url_for(FeedKind::PreMatch),
            "https://feed.example.com/xml/pre"
        );
    }
}
