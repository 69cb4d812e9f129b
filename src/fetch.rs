use anyhow::Result;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::FetchError;

/// Source of page and feed bodies.
pub trait Fetcher {
    fn get_text(&self, url: &Url) -> impl std::future::Future<Output = Result<String, FetchError>> + Send;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Stateless client, used for the calendar feed.
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
        })
    }

    /// Client that keeps cookies between requests. The league pages only
    /// follow "next page" links inside the session that produced them, so
    /// every league walk gets its own.
    pub fn with_session() -> Result<Self> {
        Ok(Self {
            client: Client::builder().cookie_store(true).build()?,
        })
    }
}

/// Hands out a new cookie session for every league walk.
pub trait SessionSource {
    type Session: Fetcher + Send + Sync;

    fn open_session(&self) -> Result<Self::Session>;
}

/// Opens [`HttpFetcher::with_session`] clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpSessions;

impl SessionSource for HttpSessions {
    type Session = HttpFetcher;

    fn open_session(&self) -> Result<HttpFetcher> {
        HttpFetcher::with_session()
    }
}

impl Fetcher for HttpFetcher {
    async fn get_text(&self, url: &Url) -> Result<String, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        debug!(%url, %status, "fetched");
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(transport)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{collections::HashMap, sync::Mutex};

    use reqwest::StatusCode;
    use url::Url;

    use super::{Fetcher, SessionSource};
    use crate::error::FetchError;

    /// Serves fixed bodies by URL and remembers every request. Unknown URLs
    /// answer 404.
    #[derive(Default)]
    pub struct CannedFetcher {
        bodies: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl CannedFetcher {
        pub fn with(mut self, url: &str, body: &str) -> Self {
            self.bodies.insert(url.to_string(), body.to_string());
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    impl Fetcher for CannedFetcher {
        async fn get_text(&self, url: &Url) -> Result<String, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.bodies
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: StatusCode::NOT_FOUND,
                })
        }
    }

    /// Counts opened sessions; each serves the same bodies.
    #[derive(Default)]
    pub struct CannedSessions {
        bodies: HashMap<String, String>,
        opened: Mutex<usize>,
    }

    impl CannedSessions {
        pub fn with(mut self, url: &str, body: &str) -> Self {
            self.bodies.insert(url.to_string(), body.to_string());
            self
        }

        pub fn opened(&self) -> usize {
            *self.opened.lock().unwrap()
        }
    }

    impl SessionSource for CannedSessions {
        type Session = CannedFetcher;

        fn open_session(&self) -> anyhow::Result<CannedFetcher> {
            *self.opened.lock().unwrap() += 1;
            Ok(CannedFetcher {
                bodies: self.bodies.clone(),
                requested: Mutex::default(),
            })
        }
    }
}
