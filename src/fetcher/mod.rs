pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;

/// Plain HTTP access to server-rendered pages.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the body as text, sending `cookie` as the
    /// `Cookie` header when given. Non-2xx responses are errors.
    async fn fetch(&self, url: &str, cookie: Option<&str>) -> Result<String>;
}
