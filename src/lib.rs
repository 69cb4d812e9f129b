pub mod calendar;
pub mod config;
pub mod error;
pub mod events;
pub mod fetch;
pub mod league;
pub mod scrape;
pub mod sync;
