use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument};

use crate::{
    config::ParserOptions,
    country::{CountryLookup, IsoCountries},
    entry::{Country, Entry, Status, Tvg, attr},
    error::Result,
    extract::{DIRECTIVE_MARKER, Fields, is_valid_url, looks_like_local_path, normalize_lines},
    playlist::Playlist,
    probe::HttpProbe,
    source,
    util::init_http_client,
};

/// How many lines after a directive may hold its location
pub const LOOKAHEAD: usize = 2;

/// An entry fresh out of the parser, before any liveness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub entry: Entry,
    /// The location is a local path rather than a network URI
    pub is_file: bool,
}

/// Indices of every directive line, in scan order
#[must_use]
pub fn directive_indices(lines: &[String]) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.starts_with(DIRECTIVE_MARKER))
        .map(|(i, _)| i)
        .collect()
}

/// Builds the entry introduced by the directive at `index`.
///
/// Returns `None` when neither of the next [`LOOKAHEAD`] lines is a URL or a
/// local path.
#[must_use]
pub fn parse_entry(
    lines: &[String],
    index: usize,
    enforce_schema: bool,
    countries: &dyn CountryLookup,
) -> Option<Candidate> {
    let directive = lines.get(index)?;
    let (location, is_file) = lines
        .iter()
        .skip(index + 1)
        .take(LOOKAHEAD)
        .find_map(|line| {
            if is_valid_url(line) {
                Some((line, false))
            } else if looks_like_local_path(line) {
                Some((line, true))
            } else {
                None
            }
        })?;

    let fields = Fields::extract(directive);
    let country_name = if fields.country_code.is_empty() {
        String::new()
    } else {
        countries
            .country_name(&fields.country_code.to_uppercase())
            .unwrap_or_default()
    };

    let has_tvg =
        !(fields.tvg_id.is_empty() && fields.tvg_name.is_empty() && fields.tvg_url.is_empty());
    let tvg = (enforce_schema || has_tvg).then(|| Tvg {
        id: attr(fields.tvg_id, enforce_schema),
        name: attr(fields.tvg_name, enforce_schema),
        url: attr(fields.tvg_url, enforce_schema),
    });

    let has_country = !(fields.country_code.is_empty() && country_name.is_empty());
    let country = (enforce_schema || has_country).then(|| Country {
        code: attr(fields.country_code, enforce_schema),
        name: attr(country_name, enforce_schema),
    });

    Some(Candidate {
        entry: Entry {
            title: attr(fields.title, enforce_schema),
            logo: attr(fields.logo, enforce_schema),
            url: location.clone(),
            category: attr(fields.category, enforce_schema),
            language: attr(fields.language, enforce_schema),
            tvg,
            country,
            status: Status::NotChecked,
        },
        is_file,
    })
}

/// Turns playlist documents into [`Playlist`]s
pub struct M3uParser {
    options: ParserOptions,
    client: reqwest::Client,
    probe: HttpProbe,
    countries: Arc<dyn CountryLookup>,
}

impl M3uParser {
    /// A parser resolving country names with the built-in ISO table
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        Self::with_countries(options, Arc::new(IsoCountries::new()))
    }

    #[must_use]
    pub fn with_countries(options: ParserOptions, countries: Arc<dyn CountryLookup>) -> Self {
        let client = init_http_client(&options.user_agent);
        let probe = HttpProbe::new(client.clone(), options.timeout, options.parallelism);
        Self {
            options,
            client,
            probe,
            countries,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Loads `input` (raw text, URL or file path) and parses it
    ///
    /// # Errors
    /// Errors when the document cannot be read or downloaded. Nothing is parsed then.
    #[instrument(skip_all)]
    pub async fn parse(&self, input: &str) -> Result<Playlist> {
        let text = source::load(&self.client, input, self.options.show_progress).await?;
        Ok(self.parse_text(&text).await)
    }

    /// Parses playlist text, probing every network location when `check_live` is set.
    ///
    /// Each directive is handled by its own task and lands in the slot matching its
    /// position, so entries keep the document's order.
    #[instrument(skip_all)]
    pub async fn parse_text(&self, text: &str) -> Playlist {
        let lines: Arc<[String]> = normalize_lines(text).into();
        if lines.is_empty() {
            info!("No content to parse");
            return Playlist::new(Vec::new());
        }

        let directives = directive_indices(&lines);
        info!(
            "Found {} directives in {} lines",
            directives.len(),
            lines.len()
        );

        let pb = if self.options.show_progress {
            let pb = ProgressBar::new(directives.len() as u64);
            pb.set_style(
                ProgressStyle::with_template(
                    "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} entries ({eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut tasks = JoinSet::new();
        for (slot, index) in directives.iter().copied().enumerate() {
            let lines = lines.clone();
            let countries = self.countries.clone();
            let probe = self.probe.clone();
            let pb = pb.clone();
            let check_live = self.options.check_live;
            let enforce_schema = self.options.enforce_schema;

            tasks.spawn(async move {
                let entry = match parse_entry(&lines, index, enforce_schema, countries.as_ref()) {
                    Some(Candidate { mut entry, is_file }) => {
                        if check_live {
                            entry.status = if is_file {
                                Status::Good
                            } else {
                                probe.probe(&entry.url).await
                            };
                        }
                        Some(entry)
                    }
                    None => {
                        debug!("No location after directive on line {index}, skipping");
                        None
                    }
                };
                pb.inc(1);
                (slot, entry)
            });
        }

        let mut slots: Vec<Option<Entry>> = vec![None; directives.len()];
        while let Some(res) = tasks.join_next().await {
            match res {
                Ok((slot, entry)) => slots[slot] = entry,
                Err(e) => error!("Parse task failed: {e}"),
            }
        }
        pb.finish_and_clear();

        let entries = slots.into_iter().flatten().collect::<Vec<Entry>>();
        info!(
            "Parsed {} entries out of {} directives",
            entries.len(),
            directives.len()
        );

        Playlist::new(entries)
    }
}
