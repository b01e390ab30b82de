use std::time::{Duration, Instant};

use shared::protocol::GeoCandidate;
use tracing::{debug, warn};

use crate::{
    config::{clamp_suggestions, MapSettings},
    error::GeocodeError,
};

/// A lookup the caller should run, tagged with its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeRequest {
    pub seq: u64,
    pub query: String,
    pub limit: usize,
}

/// Debounced geocoding suggestions for a search box.
///
/// The clock is passed in, so the caller decides when to [`poll`](Self::poll).
/// A request goes out only once the input has been unchanged for `delay` and
/// holds at least `min_chars` characters. Only the response to the most
/// recent request is applied; older ones are dropped.
#[derive(Debug, Clone)]
pub struct SuggestionSearch {
    delay: Duration,
    min_chars: usize,
    limit: usize,
    input: String,
    changed_at: Option<Instant>,
    last_seq: u64,
    awaiting: Option<u64>,
    suggestions: Vec<GeoCandidate>,
}

impl SuggestionSearch {
    pub fn new(delay: Duration, min_chars: usize, limit: usize) -> Self {
        Self {
            delay,
            min_chars: min_chars.max(1),
            limit: clamp_suggestions(limit),
            input: String::new(),
            changed_at: None,
            last_seq: 0,
            awaiting: None,
            suggestions: Vec::new(),
        }
    }

    pub fn from_settings(settings: &MapSettings) -> Self {
        Self::new(
            settings.geocode_debounce,
            settings.geocode_min_chars,
            settings.geocode_max_suggestions,
        )
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn on_input(&mut self, text: &str, now: Instant) {
        if text == self.input {
            return;
        }
        self.input = text.to_string();
        if self.query_len() < self.min_chars {
            // Too short to search: nothing pending and nothing outstanding
            // may repopulate the list.
            self.changed_at = None;
            self.awaiting = None;
            self.suggestions.clear();
        } else {
            self.changed_at = Some(now);
        }
    }

    fn query_len(&self) -> usize {
        self.input.trim().chars().count()
    }

    /// Issues a request once the input has settled.
    pub fn poll(&mut self, now: Instant) -> Option<GeocodeRequest> {
        let changed_at = self.changed_at?;
        if now.saturating_duration_since(changed_at) < self.delay {
            return None;
        }
        self.changed_at = None;
        self.last_seq += 1;
        self.awaiting = Some(self.last_seq);
        let request = GeocodeRequest {
            seq: self.last_seq,
            query: self.input.trim().to_string(),
            limit: self.limit,
        };
        debug!(seq = request.seq, query = %request.query, "issuing geocoding request");
        Some(request)
    }

    /// Applies a lookup result. Returns false when the response was stale
    /// and ignored. A failure clears the list without surfacing an error.
    pub fn accept(
        &mut self,
        seq: u64,
        result: Result<Vec<GeoCandidate>, GeocodeError>,
    ) -> bool {
        if self.awaiting != Some(seq) {
            debug!(seq, latest = self.last_seq, "discarding superseded geocoding response");
            return false;
        }
        self.awaiting = None;
        match result {
            Ok(mut candidates) => {
                candidates.truncate(self.limit);
                self.suggestions = candidates;
            }
            Err(err) => {
                warn!(seq, "geocoding failed, clearing suggestions: {err}");
                self.suggestions.clear();
            }
        }
        true
    }

    pub fn suggestions(&self) -> &[GeoCandidate] {
        &self.suggestions
    }

    /// When the pending input settles, for scheduling the next poll.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.changed_at.map(|at| at + self.delay)
    }

    pub fn is_waiting(&self) -> bool {
        self.changed_at.is_some() || self.awaiting.is_some()
    }

    /// Forgets the list, e.g. after a suggestion was picked.
    pub fn dismiss(&mut self) {
        self.changed_at = None;
        self.awaiting = None;
        self.suggestions.clear();
    }
}

#[cfg(test)]
#[path = "tests/suggestions_tests.rs"]
mod tests;
