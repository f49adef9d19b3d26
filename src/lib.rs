#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::cargo)]
#![warn(clippy::perf)]
#![warn(clippy::complexity)]
#![warn(clippy::style)]
#![allow(clippy::multiple_crate_versions)]

//! Parses M3U playlists into structured entries, optionally checks which
//! streams are alive, and filters, sorts and exports the result.

pub mod config;
pub mod country;
pub mod entry;
pub mod error;
pub mod export;
pub mod extract;
pub mod parser;
pub mod playlist;
pub mod probe;
pub mod query;
pub mod source;
pub mod util;

pub use config::ParserOptions;
pub use country::{CountryLookup, IsoCountries};
pub use entry::{Country, Entry, Status, Tvg};
pub use error::{Error, Result};
pub use parser::M3uParser;
pub use playlist::Playlist;
