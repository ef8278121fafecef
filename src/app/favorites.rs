// src/app/favorites.rs: favorite media ids, persisted through the key/value store
use std::collections::HashSet;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::app::data::Media;
use crate::app::observable::{combine_latest, Observable, Subject};
use crate::app::store::KeyValueStore;

pub const FAVORITES_KEY: &str = "favoriteMediaIds";

pub struct FavoritesState {
    ids: Subject<Vec<String>>,
    store: Rc<dyn KeyValueStore>,
}

impl FavoritesState {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        let ids = load_ids(store.as_ref());
        debug!("loaded {} favorite ids", ids.len());
        Self {
            ids: Subject::new(ids),
            store,
        }
    }

    pub fn ids(&self) -> Observable<Vec<String>> {
        self.ids.observable()
    }

    pub fn current_ids(&self) -> Vec<String> {
        self.ids.get()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.with(|ids| ids.iter().any(|x| x == id))
    }

    pub fn is_favorite(&self, id: &str) -> Observable<bool> {
        let id = id.to_string();
        self.ids().map(move |ids| ids.contains(&id))
    }

    pub fn add(&self, id: &str) {
        if self.contains(id) {
            return;
        }
        let mut next = self.ids.get();
        next.push(id.to_string());
        self.commit(next);
    }

    pub fn remove(&self, id: &str) {
        let current = self.ids.get();
        let next: Vec<String> = current.iter().filter(|x| *x != id).cloned().collect();
        if next.len() == current.len() {
            return;
        }
        self.commit(next);
    }

    pub fn toggle(&self, id: &str) {
        if self.contains(id) {
            self.remove(id);
        } else {
            self.add(id);
        }
    }

    /// Catalog items whose id is a favorite, in catalog order.
    pub fn favorite_media(&self, catalog_items: &Observable<Vec<Media>>) -> Observable<Vec<Media>> {
        combine_latest(catalog_items, &self.ids(), |items, ids| {
            let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
            items
                .iter()
                .filter(|m| wanted.contains(m.id.as_str()))
                .cloned()
                .collect()
        })
    }

    fn commit(&self, next: Vec<String>) {
        self.ids.set(next);
        self.persist();
    }

    // optimistic: a failed write leaves the in-memory list as is
    fn persist(&self) {
        let ids = self.ids.get();
        match serde_json::to_string(&ids) {
            Ok(json) => {
                if let Err(e) = self.store.save(FAVORITES_KEY, &json) {
                    warn!("failed to persist favorites: {e}");
                }
            }
            Err(e) => warn!("failed to encode favorites: {e}"),
        }
    }
}

fn load_ids(store: &dyn KeyValueStore) -> Vec<String> {
    let Some(raw) = store.load(FAVORITES_KEY) else {
        return Vec::new();
    };
    let entries = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(other) => {
            warn!("stored favorites are not a list ({other}); starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!("stored favorites are not valid JSON ({e}); starting empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::catalog::tests::{loaded_catalog, media};
    use crate::app::data::MediaCategory;
    use crate::app::store::MemoryStore;
    use std::cell::RefCell;

    fn state_with(raw: Option<&str>) -> (Rc<MemoryStore>, FavoritesState) {
        let store = Rc::new(match raw {
            Some(raw) => MemoryStore::with_value(FAVORITES_KEY, raw),
            None => MemoryStore::new(),
        });
        let state = FavoritesState::new(store.clone());
        (store, state)
    }

    #[test]
    fn loads_ids_and_drops_junk() {
        let (_, state) = state_with(Some(r#"["a", 3, "b", null, "a"]"#));
        assert_eq!(state.current_ids(), ["a", "b"]);
    }

    #[test]
    fn malformed_or_missing_data_starts_empty() {
        for raw in [None, Some("{not json"), Some(r#"{"a": 1}"#), Some("\"a\"")] {
            let (_, state) = state_with(raw);
            assert!(state.current_ids().is_empty(), "input {raw:?}");
        }
    }

    #[test]
    fn add_appends_once_and_persists() {
        let (store, state) = state_with(None);
        state.add("b");
        state.add("a");
        state.add("b");
        assert_eq!(state.current_ids(), ["b", "a"]);
        assert_eq!(store.writes().len(), 2);
        assert_eq!(store.load(FAVORITES_KEY).as_deref(), Some(r#"["b","a"]"#));
    }

    #[test]
    fn remove_missing_id_is_silent() {
        let (store, state) = state_with(Some(r#"["x"]"#));
        state.remove("nope");
        assert_eq!(state.current_ids(), ["x"]);
        assert!(store.writes().is_empty());
    }

    #[test]
    fn remove_emits_once_and_writes_once() {
        let (store, state) = state_with(Some(r#"["x","y"]"#));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = state.ids().subscribe(move |ids| sink.borrow_mut().push(ids.clone()));

        state.remove("x");

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ["x", "y"]);
        assert_eq!(seen[1], ["y"]);
        assert_eq!(
            store.writes(),
            [(FAVORITES_KEY.to_string(), r#"["y"]"#.to_string())]
        );
    }

    #[test]
    fn double_toggle_restores_membership_and_order() {
        let (_, state) = state_with(Some(r#"["a","b","c"]"#));
        state.toggle("b");
        assert_eq!(state.current_ids(), ["a", "c"]);
        state.toggle("b");
        assert_eq!(state.current_ids(), ["a", "c", "b"]);

        state.toggle("z");
        state.toggle("z");
        assert_eq!(state.current_ids(), ["a", "c", "b"]);
    }

    #[test]
    fn operations_match_a_reference_set() {
        let (_, state) = state_with(None);
        let mut reference: Vec<String> = Vec::new();
        let ops = [
            ("add", "1"), ("add", "2"), ("toggle", "1"), ("add", "3"), ("remove", "9"),
            ("toggle", "4"), ("add", "2"), ("remove", "2"), ("toggle", "1"), ("toggle", "3"),
            ("add", "5"), ("toggle", "5"), ("toggle", "5"),
        ];
        for (op, id) in ops {
            match op {
                "add" => state.add(id),
                "remove" => state.remove(id),
                _ => state.toggle(id),
            }
            let present = reference.iter().any(|x| x == id);
            match (op, present) {
                ("add", false) | ("toggle", false) => reference.push(id.to_string()),
                ("remove", true) | ("toggle", true) => reference.retain(|x| x != id),
                _ => {}
            }
            let ids = state.current_ids();
            let unique: HashSet<_> = ids.iter().collect();
            assert_eq!(unique.len(), ids.len());
            assert_eq!(ids, reference);
        }
    }

    #[test]
    fn is_favorite_tracks_changes() {
        let (_, state) = state_with(None);
        let fav = state.is_favorite("m");
        assert!(!fav.get());
        state.add("m");
        assert!(fav.get());
        state.toggle("m");
        assert!(!fav.get());
    }

    #[test]
    fn favorite_media_uses_catalog_order() {
        let catalog = loaded_catalog(vec![
            media("1", MediaCategory::Movie, ""),
            media("2", MediaCategory::Movie, ""),
            media("3", MediaCategory::Series, ""),
            media("4", MediaCategory::Series, ""),
        ]);
        let (_, state) = state_with(None);
        state.add("4");
        state.add("2");
        state.add("ghost");

        let favs = state.favorite_media(&catalog.items());
        let ids: Vec<String> = favs.get().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, ["2", "4"]);

        state.remove("4");
        assert_eq!(favs.get().len(), 1);
    }

    #[test]
    fn failed_write_keeps_in_memory_change() {
        let (store, state) = state_with(None);
        store.set_fail_writes(true);
        state.add("kept");
        assert!(state.contains("kept"));
        assert_eq!(store.load(FAVORITES_KEY), None);
    }
}
