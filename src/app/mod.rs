// src/app/mod.rs: app shell: routing, per-frame polling, view dispatch

// ---- Standard lib imports ----
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

// ---- Crates ----
use eframe::egui as eg;
use tracing::{debug, info};

// ---- Local modules ----
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod confirm;
pub mod data;
pub mod detail;
pub mod favorites;
pub mod filters;
pub mod observable;
pub mod prefetch;
pub mod routes;
pub mod store;
pub mod types;
pub mod ui;
pub mod views;

use crate::config::AppConfig;
use auth::AuthState;
use catalog::{CatalogSource, CatalogState};
use confirm::RemovalRequest;
use favorites::FavoritesState;
use prefetch::PosterLoader;
use routes::{guard, Route};
use store::KeyValueStore;
use types::CardAction;
use views::{DetailView, FavoritesView, LoginView, MediaListView};

// ---- Tunables ----
const LOADING_REPAINT: Duration = Duration::from_millis(100);

/// Something the user asked for while a frame was drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Go(Route),
    Logout,
    Card(CardAction),
}

/// State of the screen currently shown. Replacing it drops the old view's subscriptions.
pub enum ActiveView {
    Login(LoginView),
    MediaList(MediaListView),
    Favorites(FavoritesView),
    Detail(DetailView),
}

pub struct CineApp {
    config: AppConfig,
    auth: AuthState,
    catalog: CatalogState,
    favorites: FavoritesState,
    posters: PosterLoader,
    route: Route,
    view: ActiveView,
}

impl CineApp {
    pub fn new(
        config: AppConfig,
        store: Rc<dyn KeyValueStore>,
        source: Arc<dyn CatalogSource>,
        posters: PosterLoader,
    ) -> Self {
        let auth = AuthState::new(Rc::clone(&store));
        let favorites = FavoritesState::new(store);
        let catalog = CatalogState::new(source);

        let start = config.start_route.clone().unwrap_or_else(|| {
            if auth.is_logged_in() {
                Route::MediaList
            } else {
                Route::Login
            }
        });

        let mut app = Self {
            config,
            auth,
            catalog,
            favorites,
            posters,
            route: Route::Login,
            view: ActiveView::Login(LoginView::default()),
        };
        app.navigate(start);
        app
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn view(&self) -> &ActiveView {
        &self.view
    }

    /// Switch screens through the login guard. Same-route navigation is a no-op.
    pub fn navigate(&mut self, requested: Route) {
        let route = guard(requested.clone(), self.auth.is_logged_in());
        if route != requested {
            info!("{} requires login; redirecting to {}", requested.path(), route.path());
        }
        if route == self.route {
            return;
        }
        debug!("navigate {} -> {}", self.route.path(), route.path());

        if route.requires_login() {
            self.catalog.load();
        }
        self.view = match &route {
            Route::Login => ActiveView::Login(LoginView::default()),
            Route::MediaList => ActiveView::MediaList(MediaListView::new(
                &self.catalog,
                self.config.filter_debounce,
            )),
            Route::Favorites => {
                ActiveView::Favorites(FavoritesView::new(&self.favorites, &self.catalog))
            }
            Route::Detail(id) => ActiveView::Detail(DetailView::new(id, &self.favorites)),
        };
        self.route = route;
    }

    pub fn logout(&mut self) {
        self.auth.logout();
        self.navigate(Route::Login);
    }

    pub fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::Go(route) => self.navigate(route),
            Intent::Logout => self.logout(),
            Intent::Card(CardAction::Open(id)) => self.navigate(Route::Detail(id)),
            Intent::Card(CardAction::ToggleFavorite(id)) => self.favorites.toggle(&id),
            Intent::Card(CardAction::RequestRemove(id)) => {
                let ActiveView::Favorites(view) = &mut self.view else {
                    debug!("removal of `{id}` requested outside the favorites view");
                    return;
                };
                match view.request_remove(&id, &self.catalog) {
                    RemovalRequest::Opened => debug!("confirmation opened for `{id}`"),
                    RemovalRequest::Busy | RemovalRequest::UnknownMedia => {}
                }
            }
        }
    }

    /// Settle debounced filter input and schedule the next wake-up.
    fn tick(&mut self, ctx: &eg::Context, now: Instant) {
        let ActiveView::MediaList(view) = &mut self.view else {
            return;
        };
        if view.tick(now) {
            debug!("filters applied: {:?}", view.criteria());
        }
        if let Some(deadline) = view.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }
}

impl eframe::App for CineApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        if self.catalog.poll() {
            ctx.request_repaint();
        }
        if self.catalog.loading_now() {
            ctx.request_repaint_after(LOADING_REPAINT);
        }
        self.posters.begin_frame(ctx);
        self.tick(ctx, Instant::now());

        let mut intents: Vec<Intent> = Vec::new();

        if self.auth.is_logged_in() {
            let nav = eg::TopBottomPanel::top("nav_bar")
                .show(ctx, |ui| self.ui_render_nav(ui))
                .inner;
            intents.extend(nav);
        }

        let body = eg::CentralPanel::default()
            .show(ctx, |ui| self.ui_render_view(ui, ctx))
            .inner;
        intents.extend(body);

        self.ui_render_confirm(ctx);

        for intent in intents {
            self.apply(intent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::auth::LOGIN_KEY;
    use crate::app::catalog::tests::{media, FixedSource};
    use crate::app::data::MediaCategory;
    use crate::app::store::MemoryStore;

    fn app_with(store: MemoryStore, start: Option<Route>) -> CineApp {
        let config = AppConfig {
            start_route: start,
            ..AppConfig::default()
        };
        let source = FixedSource(Ok(vec![
            media("p1", MediaCategory::Movie, "Drama"),
            media("s1", MediaCategory::Series, "Comedia"),
        ]));
        CineApp::new(config, Rc::new(store), Arc::new(source), PosterLoader::disabled())
    }

    #[test]
    fn logged_out_start_lands_on_login() {
        let app = app_with(MemoryStore::new(), Some(Route::Favorites));
        assert_eq!(app.route(), &Route::Login);
        assert!(matches!(app.view(), ActiveView::Login(_)));
    }

    #[test]
    fn stored_login_resumes_on_media_list() {
        let app = app_with(MemoryStore::with_value(LOGIN_KEY, "true"), None);
        assert_eq!(app.route(), &Route::MediaList);
        assert!(matches!(app.view(), ActiveView::MediaList(_)));
    }

    #[test]
    fn logout_returns_to_login_and_guards_routes() {
        let mut app = app_with(MemoryStore::with_value(LOGIN_KEY, "true"), None);
        app.apply(Intent::Go(Route::Favorites));
        assert_eq!(app.route(), &Route::Favorites);

        app.apply(Intent::Logout);
        assert_eq!(app.route(), &Route::Login);
        app.apply(Intent::Go(Route::Detail("p1".into())));
        assert_eq!(app.route(), &Route::Login);
    }

    #[test]
    fn card_actions_reach_favorites_and_detail() {
        let mut app = app_with(MemoryStore::with_value(LOGIN_KEY, "true"), None);
        app.catalog.wait();

        app.apply(Intent::Card(CardAction::ToggleFavorite("s1".into())));
        assert!(app.favorites.contains("s1"));

        app.apply(Intent::Card(CardAction::Open("s1".into())));
        assert_eq!(app.route(), &Route::Detail("s1".into()));
    }

    #[test]
    fn removal_waits_for_confirmation() {
        let mut app = app_with(
            MemoryStore::with_value(LOGIN_KEY, "true"),
            Some(Route::Favorites),
        );
        app.catalog.wait();
        app.favorites.add("p1");

        app.apply(Intent::Card(CardAction::RequestRemove("p1".into())));
        assert!(app.favorites.contains("p1"));

        let ActiveView::Favorites(view) = &mut app.view else {
            panic!("expected favorites view");
        };
        assert!(view.gate.is_busy());
        assert!(view.resolve(Some(true), &app.favorites));
        assert!(!app.favorites.contains("p1"));
    }
}
