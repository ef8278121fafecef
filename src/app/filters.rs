// src/app/filters.rs
use std::time::{Duration, Instant};

use itertools::Itertools;

use super::data::Media;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Exact category value; empty means any.
    pub category: String,
    /// Case-insensitive genre substring; empty means any.
    pub genre: String,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.category.is_empty() && self.genre.is_empty()
    }
}

pub fn apply_filters(items: &[Media], criteria: &FilterCriteria) -> Vec<Media> {
    let genre = criteria.genre.to_lowercase();
    items
        .iter()
        .filter(|m| criteria.category.is_empty() || m.category.as_str() == criteria.category)
        .filter(|m| genre.is_empty() || m.genre.to_lowercase().contains(&genre))
        .cloned()
        .collect()
}

/// Sorted, de-duplicated genre names for the filter dropdown.
pub fn collect_genres(items: &[Media]) -> Vec<String> {
    items
        .iter()
        .flat_map(|m| m.genre.split(','))
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .sorted_by_key(|g| g.to_lowercase())
        .dedup_by(|a, b| a.eq_ignore_ascii_case(b))
        .collect()
}

/// Holds back rapid input until it has been stable for `window`, then releases
/// it once. A settled value equal to the last released one is dropped.
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
    last_emitted: Option<T>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            last_emitted: None,
        }
    }

    /// Treat `initial` as already released.
    pub fn with_initial(window: Duration, initial: T) -> Self {
        Self {
            window,
            pending: None,
            last_emitted: Some(initial),
        }
    }

    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let (_, at) = self.pending.as_ref()?;
        if now.duration_since(*at) < self.window {
            return None;
        }
        let (value, _) = self.pending.take()?;
        if self.last_emitted.as_ref() == Some(&value) {
            return None;
        }
        self.last_emitted = Some(value.clone());
        Some(value)
    }

    /// When the pending value will settle, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.window)
    }
}
