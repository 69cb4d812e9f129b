//! Client for the WordPress "The Events Calendar" REST API.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use html_escape::decode_html_entities;
use reqwest::{header::AUTHORIZATION, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{error::WriteError, league::Game};

const EVENTS_API: &str = "wp-json/tribe/events/v1/";
const EVENTS_PER_PAGE: u32 = 50;
const CANCELLED_PREFIX: &str = "[ABGESAGT] ";

/// An event already present on the website.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublishedEvent {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub website: String,
}

/// Request body for creating an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent<'a> {
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub timezone: &'static str,
    /// `None` serializes as `null`: the event is published without a venue.
    pub venue: Option<u64>,
    pub categories: &'a [String],
    pub show_map: bool,
    pub website: &'a str,
}

impl<'a> NewEvent<'a> {
    /// Game times are wall-clock values published as UTC.
    pub fn from_game(game: &Game, venue: Option<u64>, categories: &'a [String], website: &'a str) -> Self {
        Self {
            title: event_title(game),
            start_date: game.start.strftime("%Y-%m-%d %H:%M:%S").to_string(),
            end_date: game.end.strftime("%Y-%m-%d %H:%M:%S").to_string(),
            timezone: "UTC",
            venue,
            categories,
            show_map: true,
            website,
        }
    }
}

pub fn event_title(game: &Game) -> String {
    if game.cancelled {
        format!("{CANCELLED_PREFIX}{}", game.title)
    } else {
        game.title.clone()
    }
}

/// Operations the sync needs from the event calendar.
pub trait EventApi {
    /// Creates the venue, or updates the one with the same name. Returns its id.
    fn upsert_venue(
        &self,
        name: &str,
        address: &str,
    ) -> impl std::future::Future<Output = Result<u64, WriteError>> + Send;
    /// Every event whose website field is `website`.
    fn list_events_for_website(
        &self,
        website: &str,
    ) -> impl std::future::Future<Output = Result<Vec<PublishedEvent>, WriteError>> + Send;
    fn delete_event(&self, id: u64) -> impl std::future::Future<Output = Result<(), WriteError>> + Send;
    fn create_event(
        &self,
        event: &NewEvent<'_>,
    ) -> impl std::future::Future<Output = Result<(), WriteError>> + Send;
}

#[derive(Clone)]
pub struct WordPressClient {
    http_client: reqwest::Client,
    api_root: Url,
    authorization: String,
}

impl WordPressClient {
    pub fn new(base_url: &Url, username: &str, password: &str) -> Result<Self> {
        Ok(Self {
            http_client: reqwest::Client::new(),
            api_root: base_url
                .join(EVENTS_API)
                .with_context(|| format!("can't build events api url from {base_url}"))?,
            authorization: basic_authorization(username, password),
        })
    }

    fn endpoint(&self, path: &str, operation: &str) -> Result<Url, WriteError> {
        self.api_root.join(path).map_err(|source| WriteError::Url {
            operation: operation.to_string(),
            source,
        })
    }

    async fn events_page(&self, page: u32) -> Result<EventsPage, WriteError> {
        let operation = format!("list events page {page}");
        let url = self.endpoint(
            &format!("events?per_page={EVENTS_PER_PAGE}&starts_after=1900-01-01&page={page}"),
            &operation,
        )?;
        let response = self
            .http_client
            .get(url)
            .header(AUTHORIZATION, &self.authorization)
            .send()
            .await;
        let response = checked(&operation, response).await?;
        response
            .json::<EventsPage>()
            .await
            .map_err(|source| WriteError::Request { operation, source })
    }
}

#[derive(Debug, Deserialize)]
struct EventsPage {
    #[serde(default)]
    events: Vec<PublishedEvent>,
    #[serde(default)]
    next_rest_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Created {
    id: u64,
}

#[derive(Serialize)]
struct VenueBody<'a> {
    venue: &'a str,
    address: &'a str,
}

impl EventApi for WordPressClient {
    async fn upsert_venue(&self, name: &str, address: &str) -> Result<u64, WriteError> {
        let operation = format!("upsert venue {name:?}");
        let url = self.endpoint("venues", &operation)?;
        let response = self
            .http_client
            .post(url)
            .header(AUTHORIZATION, &self.authorization)
            .json(&VenueBody {
                venue: name,
                address,
            })
            .send()
            .await;
        let response = checked(&operation, response).await?;
        let created = response
            .json::<Created>()
            .await
            .map_err(|source| WriteError::Request { operation, source })?;
        Ok(created.id)
    }

    async fn list_events_for_website(&self, website: &str) -> Result<Vec<PublishedEvent>, WriteError> {
        let mut events = Vec::new();
        // next_rest_url itself is rejected by the API, so only use it as a
        // "there is more" flag
        for page in 1.. {
            let EventsPage {
                events: page_events,
                next_rest_url,
            } = self.events_page(page).await?;
            debug!(page, count = page_events.len(), "listed events");
            events.extend(page_events);
            if next_rest_url.map_or(true, |next| next.is_empty()) {
                break;
            }
        }
        Ok(for_website(events, website))
    }

    async fn delete_event(&self, id: u64) -> Result<(), WriteError> {
        let operation = format!("delete event {id}");
        let url = self.endpoint(&format!("events/{id}"), &operation)?;
        let response = self
            .http_client
            .delete(url)
            .header(AUTHORIZATION, &self.authorization)
            .send()
            .await;
        checked(&operation, response).await?;
        Ok(())
    }

    async fn create_event(&self, event: &NewEvent<'_>) -> Result<(), WriteError> {
        let operation = format!("create event {:?}", event.title);
        let url = self.endpoint("events", &operation)?;
        let response = self
            .http_client
            .post(url)
            .header(AUTHORIZATION, &self.authorization)
            .json(event)
            .send()
            .await;
        checked(&operation, response).await?;
        Ok(())
    }
}

async fn checked(operation: &str, response: reqwest::Result<Response>) -> Result<Response, WriteError> {
    let response = response.map_err(|source| WriteError::Request {
        operation: operation.to_string(),
        source,
    })?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(WriteError::Status {
        operation: operation.to_string(),
        status,
        body,
    })
}

pub fn basic_authorization(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// The API returns the website field HTML-escaped.
fn for_website(events: Vec<PublishedEvent>, website: &str) -> Vec<PublishedEvent> {
    events
        .into_iter()
        .filter(|event| decode_html_entities(&event.website) == website)
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        UpsertVenue(String, String),
        List(String),
        Delete(u64),
        Create(String),
    }

    /// Records calls in order; venues get ids from 100 upwards.
    #[derive(Default)]
    pub struct RecordingApi {
        pub existing: Vec<PublishedEvent>,
        pub created: Mutex<Vec<serde_json::Value>>,
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingApi {
        pub fn with_existing(existing: Vec<PublishedEvent>) -> Self {
            Self {
                existing,
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl EventApi for RecordingApi {
        async fn upsert_venue(&self, name: &str, address: &str) -> Result<u64, WriteError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call::UpsertVenue(name.to_string(), address.to_string()));
            let venues = calls.iter().filter(|c| matches!(c, Call::UpsertVenue(..))).count();
            Ok(99 + venues as u64)
        }

        async fn list_events_for_website(&self, website: &str) -> Result<Vec<PublishedEvent>, WriteError> {
            self.calls.lock().unwrap().push(Call::List(website.to_string()));
            Ok(for_website(self.existing.clone(), website))
        }

        async fn delete_event(&self, id: u64) -> Result<(), WriteError> {
            self.calls.lock().unwrap().push(Call::Delete(id));
            Ok(())
        }

        async fn create_event(&self, event: &NewEvent<'_>) -> Result<(), WriteError> {
            self.calls.lock().unwrap().push(Call::Create(event.title.clone()));
            self.created
                .lock()
                .unwrap()
                .push(serde_json::to_value(event).unwrap());
            Ok(())
        }
    }
}
