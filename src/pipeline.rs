//! Enrichment pipeline
//!
//! ingest rows → artist popularity → price tiers (fetch + extract, cached)
//! → day offset → hype index → risk label → rank
//!
//! Per-event stages run with bounded concurrency; a page that cannot be
//! fetched or parsed degrades that event to absent tiers and never aborts
//! the run.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::{normalize_url, PageFetcher, PriceCache};
use crate::model::{Annotations, EventRecord, InputRow, PriceTierSet, TrackRecord};
use crate::ranking::rank;
use crate::scoring::score_event;

/// Tracks and events split out of one ingested record set
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub tracks: Vec<TrackRecord>,
    pub events: Vec<EventRecord>,
}

impl Dataset {
    /// Split rows by their `type`; unknown row types are dropped
    pub fn from_rows(rows: Vec<InputRow>) -> Self {
        let mut dataset = Dataset::default();
        let mut skipped = 0usize;

        for row in rows {
            match row {
                InputRow::Track(track) => dataset.tracks.push(track),
                InputRow::Event(event) => dataset.events.push(event),
                InputRow::Other => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!("Skipped {} rows of unknown type", skipped);
        }
        dataset
    }

    /// Merge annotations into events by position. Fields an entry leaves
    /// unset keep the row's own value.
    pub fn annotate(mut self, annotations: Vec<Annotations>) -> Self {
        let (given, events) = (annotations.len(), self.events.len());
        if given > events {
            warn!("{} annotations for {} events; extra entries are ignored", given, events);
        } else if given < events {
            warn!("{} annotations for {} events; the last {} events keep their own", given, events, events - given);
        }

        self.events = self
            .events
            .into_iter()
            .zip(annotations.into_iter().map(Some).chain(std::iter::repeat_with(|| None)))
            .map(|(event, annotation)| match annotation {
                Some(a) if !a.is_empty() => {
                    let merged = event.annotations.clone().merged_with(a);
                    event.with_annotations(merged)
                }
                _ => event,
            })
            .collect();
        self
    }
}

/// Mean popularity per artist over tracks that carry one
pub fn artist_popularity(tracks: &[TrackRecord]) -> HashMap<String, f64> {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for track in tracks {
        if let Some(p) = track.popularity.filter(|p| p.is_finite()) {
            let entry = sums.entry(track.artist.as_str()).or_insert((0.0, 0));
            entry.0 += p;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(artist, (sum, n))| (artist.to_string(), sum / n as f64))
        .collect()
}

/// Runs the enrichment stages over a dataset
pub struct Enricher {
    config: Config,
    fetcher: Arc<dyn PageFetcher>,
    cache: PriceCache,
}

impl Enricher {
    pub fn new(config: Config, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            config,
            fetcher,
            cache: PriceCache::new(),
        }
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    /// Price tiers for one event; absent on a missing or unusable URL
    pub async fn price_tiers(&self, event: &EventRecord) -> PriceTierSet {
        let Some(raw) = event.source_url() else {
            return PriceTierSet::empty();
        };

        let url = match normalize_url(raw, &self.config.fetch.base_url) {
            Ok(url) => url,
            Err(e) => {
                warn!("Skipping price lookup for {}: {}", event.artist, e);
                return PriceTierSet::empty();
            }
        };

        self.cache
            .get_or_fetch(&url, self.fetcher.as_ref(), self.config.fetch.page_budget())
            .await
    }

    async fn enrich_event(
        &self,
        event: EventRecord,
        popularity: &HashMap<String, f64>,
        today: NaiveDate,
    ) -> EventRecord {
        let artist_popularity = popularity.get(&event.artist).copied();
        let event = event.with_popularity(artist_popularity);
        let tiers = self.price_tiers(&event).await;
        score_event(event.with_tiers(tiers), &self.config.scoring, today)
    }

    /// Enrich and rank every event. `today` anchors day offsets.
    pub async fn enrich(&self, dataset: Dataset, today: NaiveDate) -> Result<Vec<EventRecord>> {
        if dataset.events.is_empty() {
            return Err(Error::NoEvents(format!(
                "{} rows carried no event records",
                dataset.tracks.len()
            )));
        }

        let popularity = artist_popularity(&dataset.tracks);
        let total = dataset.events.len();
        info!(
            "Enriching {} events ({} artists with popularity), concurrency {}",
            total,
            popularity.len(),
            self.config.fetch.concurrency
        );

        let popularity = &popularity;
        let scored: Vec<EventRecord> = stream::iter(dataset.events)
            .map(|event| self.enrich_event(event, popularity, today))
            .buffered(self.config.fetch.concurrency.max(1))
            .collect()
            .await;

        let priced = scored.iter().filter(|e| !e.tiers.is_empty()).count();
        let (lookups, fetches, failures) = self.cache.stats().snapshot();
        info!(
            "Priced {}/{} events ({} lookups, {} page fetches, {} failed)",
            priced, total, lookups, fetches, failures
        );

        Ok(rank(scored))
    }
}
