// src/app/confirm.rs: one removal confirmation at a time
use tracing::{debug, info, warn};

use super::catalog::CatalogState;
use super::favorites::FavoritesState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRemoval {
    pub media_id: String,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalRequest {
    /// Confirmation is now pending.
    Opened,
    /// Another confirmation is still open; request dropped.
    Busy,
    /// Id not present in the catalog; request dropped.
    UnknownMedia,
}

#[derive(Default)]
pub struct RemovalGate {
    pending: Option<PendingRemoval>,
}

impl RemovalGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingRemoval> {
        self.pending.as_ref()
    }

    pub fn request(&mut self, media_id: &str, catalog: &CatalogState) -> RemovalRequest {
        if let Some(p) = &self.pending {
            debug!(
                "confirmation for `{}` still open; ignoring removal of `{media_id}`",
                p.media_id
            );
            return RemovalRequest::Busy;
        }
        let Some(item) = catalog.get_by_id(media_id) else {
            warn!("removal requested for unknown media `{media_id}`");
            return RemovalRequest::UnknownMedia;
        };
        self.pending = Some(PendingRemoval {
            media_id: item.id,
            message: format!("Remove \"{}\" from your favorites?", item.title),
        });
        RemovalRequest::Opened
    }

    /// Close the pending confirmation. `None` means dismissed and counts as no.
    /// Returns true when a favorite was removed.
    pub fn resolve(&mut self, answer: Option<bool>, favorites: &FavoritesState) -> bool {
        let Some(p) = self.pending.take() else {
            return false;
        };
        if answer == Some(true) {
            info!("removing favorite `{}`", p.media_id);
            favorites.remove(&p.media_id);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::catalog::tests::{loaded_catalog, media};
    use crate::app::data::MediaCategory;
    use crate::app::favorites::FAVORITES_KEY;
    use crate::app::store::MemoryStore;
    use std::rc::Rc;

    fn setup() -> (CatalogState, Rc<MemoryStore>, FavoritesState) {
        let catalog = loaded_catalog(vec![
            media("a", MediaCategory::Movie, ""),
            media("b", MediaCategory::Series, ""),
        ]);
        let store = Rc::new(MemoryStore::with_value(FAVORITES_KEY, r#"["a","b"]"#));
        let favorites = FavoritesState::new(store.clone());
        (catalog, store, favorites)
    }

    #[test]
    fn confirmed_removal_hits_favorites() {
        let (catalog, _, favorites) = setup();
        let mut gate = RemovalGate::new();
        assert_eq!(gate.request("a", &catalog), RemovalRequest::Opened);
        assert_eq!(
            gate.pending().map(|p| p.message.as_str()),
            Some("Remove \"Title a\" from your favorites?")
        );
        assert!(gate.resolve(Some(true), &favorites));
        assert_eq!(favorites.current_ids(), ["b"]);
        assert!(!gate.is_busy());
    }

    #[test]
    fn declined_or_dismissed_changes_nothing() {
        let (catalog, store, favorites) = setup();
        let mut gate = RemovalGate::new();
        for answer in [Some(false), None] {
            gate.request("a", &catalog);
            assert!(!gate.resolve(answer, &favorites));
        }
        assert_eq!(favorites.current_ids(), ["a", "b"]);
        assert!(store.writes().is_empty());
    }

    #[test]
    fn second_request_while_pending_is_dropped() {
        let (catalog, _, favorites) = setup();
        let mut gate = RemovalGate::new();
        assert_eq!(gate.request("a", &catalog), RemovalRequest::Opened);
        assert_eq!(gate.request("b", &catalog), RemovalRequest::Busy);
        assert!(gate.resolve(Some(true), &favorites));
        // b was never queued
        assert!(!gate.resolve(Some(true), &favorites));
        assert_eq!(favorites.current_ids(), ["b"]);
    }

    #[test]
    fn unknown_media_is_not_confirmed() {
        let (catalog, _, _) = setup();
        let mut gate = RemovalGate::new();
        assert_eq!(gate.request("ghost", &catalog), RemovalRequest::UnknownMedia);
        assert!(!gate.is_busy());
    }
}
