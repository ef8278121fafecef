// src/app/views.rs: per-screen state; dropping a view drops its subscriptions
use std::time::{Duration, Instant};

use tracing::warn;

use super::auth::{AuthState, LoginError};
use super::catalog::CatalogState;
use super::confirm::{RemovalGate, RemovalRequest};
use super::data::Media;
use super::favorites::FavoritesState;
use super::filters::{apply_filters, collect_genres, Debouncer, FilterCriteria};
use super::observable::{combine_latest, Observable, Subject};

// ---- catalog banner ----
/// What the catalog-backed screens show above their content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogBanner {
    Loading,
    Failed(String),
    Settled,
}

fn catalog_banner(catalog: &CatalogState) -> Observable<CatalogBanner> {
    combine_latest(&catalog.is_loading(), &catalog.error_message(), |loading, error| {
        if *loading {
            CatalogBanner::Loading
        } else if !error.is_empty() {
            CatalogBanner::Failed(error.clone())
        } else {
            CatalogBanner::Settled
        }
    })
}

// ---- login ----
#[derive(Default)]
pub struct LoginView {
    pub username: String,
    pub password: String,
    pub error: Option<LoginError>,
}

impl LoginView {
    /// Returns true on success.
    pub fn submit(&mut self, auth: &AuthState) -> bool {
        match auth.login(&self.username, &self.password) {
            Ok(()) => {
                self.error = None;
                self.password.clear();
                true
            }
            Err(e) => {
                self.error = Some(e);
                false
            }
        }
    }
}

// ---- media list ----
pub struct MediaListView {
    /// Live form values, edited directly by the filter bar.
    pub form: FilterCriteria,
    criteria: Subject<FilterCriteria>,
    debouncer: Debouncer<FilterCriteria>,
    filtered: Observable<Vec<Media>>,
    genres: Observable<Vec<String>>,
    banner: Observable<CatalogBanner>,
}

impl MediaListView {
    pub fn new(catalog: &CatalogState, debounce: Duration) -> Self {
        let criteria = Subject::new(FilterCriteria::default());
        let items = catalog.items();
        let filtered = combine_latest(&items, &criteria.observable(), |items, c| {
            apply_filters(items, c)
        });
        let genres = items.map(|items| collect_genres(items));
        Self {
            form: FilterCriteria::default(),
            criteria,
            debouncer: Debouncer::with_initial(debounce, FilterCriteria::default()),
            filtered,
            genres,
            banner: catalog_banner(catalog),
        }
    }

    pub fn form_changed(&mut self, now: Instant) {
        self.debouncer.push(self.form.clone(), now);
    }

    pub fn reset_filters(&mut self, now: Instant) {
        self.form = FilterCriteria::default();
        self.form_changed(now);
    }

    /// Apply settled form input. Returns true when the criteria changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(next) => self.criteria.set_if_changed(next),
            None => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.criteria.get()
    }

    pub fn filtered(&self) -> Vec<Media> {
        self.filtered.get()
    }

    pub fn genres(&self) -> Vec<String> {
        self.genres.get()
    }

    pub fn banner(&self) -> CatalogBanner {
        self.banner.get()
    }
}

// ---- favorites ----
pub struct FavoritesView {
    media: Observable<Vec<Media>>,
    banner: Observable<CatalogBanner>,
    pub gate: RemovalGate,
}

impl FavoritesView {
    pub fn new(favorites: &FavoritesState, catalog: &CatalogState) -> Self {
        Self {
            media: favorites.favorite_media(&catalog.items()),
            banner: catalog_banner(catalog),
            gate: RemovalGate::new(),
        }
    }

    pub fn media(&self) -> Vec<Media> {
        self.media.get()
    }

    pub fn banner(&self) -> CatalogBanner {
        self.banner.get()
    }

    pub fn request_remove(&mut self, media_id: &str, catalog: &CatalogState) -> RemovalRequest {
        self.gate.request(media_id, catalog)
    }

    pub fn resolve(&mut self, answer: Option<bool>, favorites: &FavoritesState) -> bool {
        self.gate.resolve(answer, favorites)
    }
}

// ---- detail ----
#[derive(Clone, Debug, PartialEq)]
pub enum DetailStatus {
    Loading,
    Failed(String),
    NotFound(String),
    Ready(Media),
}

/// A lookup miss only means "not found" once the catalog has settled.
pub fn detail_status(catalog: &CatalogState, id: &str) -> DetailStatus {
    if let Some(item) = catalog.get_by_id(id) {
        return DetailStatus::Ready(item);
    }
    if catalog.loading_now() {
        return DetailStatus::Loading;
    }
    let error = catalog.error_now();
    if !error.is_empty() {
        return DetailStatus::Failed(error);
    }
    DetailStatus::NotFound(id.to_string())
}

pub struct DetailView {
    media_id: String,
    is_favorite: Observable<bool>,
}

impl DetailView {
    pub fn new(media_id: &str, favorites: &FavoritesState) -> Self {
        Self {
            media_id: media_id.to_string(),
            is_favorite: favorites.is_favorite(media_id),
        }
    }

    pub fn media_id(&self) -> &str {
        &self.media_id
    }

    pub fn status(&self, catalog: &CatalogState) -> DetailStatus {
        detail_status(catalog, &self.media_id)
    }

    pub fn is_favorite(&self) -> bool {
        self.is_favorite.get()
    }

    pub fn toggle_favorite(&self, catalog: &CatalogState, favorites: &FavoritesState) {
        match self.status(catalog) {
            DetailStatus::Ready(item) => favorites.toggle(&item.id),
            _ => warn!("cannot toggle favorite: `{}` not available", self.media_id),
        }
    }
}
