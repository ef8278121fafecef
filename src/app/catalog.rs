// src/app/catalog.rs: one-shot catalog fetch + loading/error/items state
use std::cell::{Cell, RefCell};
use std::fs;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use reqwest::blocking::Client;
use tracing::{debug, info, warn};

use crate::app::data::{CatalogDocument, Media};
use crate::app::observable::{Observable, Subject};
use crate::app::types::CatalogMsg;

/// Where the catalog document comes from. Runs on a worker thread.
pub trait CatalogSource: Send + Sync {
    fn fetch(&self) -> Result<CatalogDocument, String>;
    fn describe(&self) -> String;
}

pub fn is_remote(location: &str) -> bool {
    let l = location.trim_start().to_ascii_lowercase();
    l.starts_with("http://") || l.starts_with("https://")
}

/// JSON catalog read from a local path or fetched over http(s).
pub struct JsonCatalogSource {
    location: String,
}

impl JsonCatalogSource {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    fn fetch_remote(&self) -> Result<String, String> {
        // no request timeout: the fetch waits until the server answers
        let client = Client::builder()
            .user_agent("cinelist/catalog")
            .timeout(None)
            .build()
            .map_err(|e| format!("http client: {e}"))?;
        let resp = client
            .get(&self.location)
            .send()
            .map_err(|e| format!("Failed to load the media catalog: {e}"))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!(
                "Failed to load the media catalog: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )
            .trim_end()
            .to_string());
        }
        resp.text()
            .map_err(|e| format!("Failed to load the media catalog: read body: {e}"))
    }
}

impl CatalogSource for JsonCatalogSource {
    fn fetch(&self) -> Result<CatalogDocument, String> {
        let raw = if is_remote(&self.location) {
            self.fetch_remote()?
        } else {
            fs::read_to_string(&self.location).map_err(|e| {
                format!("Failed to load the media catalog from {}: {e}", self.location)
            })?
        };
        CatalogDocument::parse(&raw).map_err(|e| format!("Failed to load the media catalog: {e}"))
    }

    fn describe(&self) -> String {
        self.location.clone()
    }
}

/// Single source of truth for what exists in the catalog.
pub struct CatalogState {
    items: Subject<Vec<Media>>,
    is_loading: Subject<bool>,
    error_message: Subject<String>,
    source: Arc<dyn CatalogSource>,
    rx: RefCell<Option<Receiver<CatalogMsg>>>,
    started: Cell<bool>,
}

impl CatalogState {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            items: Subject::new(Vec::new()),
            is_loading: Subject::new(false),
            error_message: Subject::new(String::new()),
            source,
            rx: RefCell::new(None),
            started: Cell::new(false),
        }
    }

    /// Start the one-shot fetch on a worker thread. Later calls are ignored.
    pub fn load(&self) {
        if self.started.replace(true) {
            debug!("catalog load already started; ignoring");
            return;
        }

        self.is_loading.set(true);
        self.error_message.set(String::new());

        let (tx, rx) = mpsc::channel::<CatalogMsg>();
        *self.rx.borrow_mut() = Some(rx);

        let source = Arc::clone(&self.source);
        info!("Loading media catalog from {}", source.describe());
        std::thread::spawn(move || {
            let msg = match source.fetch() {
                Ok(doc) => CatalogMsg::Done(doc.into_items()),
                Err(e) => CatalogMsg::Error(e),
            };
            let _ = tx.send(msg);
        });
    }

    /// Apply the worker result if it has arrived. Returns true when state changed.
    pub fn poll(&self) -> bool {
        let msg = {
            let rx = self.rx.borrow();
            let Some(rx) = rx.as_ref() else {
                return false;
            };
            match rx.try_recv() {
                Ok(msg) => msg,
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => {
                    CatalogMsg::Error("Failed to load the media catalog: loader stopped".into())
                }
            }
        };
        self.rx.borrow_mut().take();
        self.apply(msg);
        true
    }

    /// Block until the pending fetch (if any) has been applied.
    pub fn wait(&self) {
        let msg = {
            let rx = self.rx.borrow();
            let Some(rx) = rx.as_ref() else {
                return;
            };
            rx.recv().unwrap_or_else(|_| {
                CatalogMsg::Error("Failed to load the media catalog: loader stopped".into())
            })
        };
        self.rx.borrow_mut().take();
        self.apply(msg);
    }

    fn apply(&self, msg: CatalogMsg) {
        match msg {
            CatalogMsg::Done(items) => {
                info!("Media catalog loaded ({} items)", items.len());
                self.items.set(items);
                self.error_message.set(String::new());
            }
            CatalogMsg::Error(e) => {
                warn!("{e}");
                self.error_message.set(e);
            }
        }
        self.is_loading.set(false);
    }

    pub fn items(&self) -> Observable<Vec<Media>> {
        self.items.observable()
    }

    pub fn get_all(&self) -> Vec<Media> {
        self.items.get()
    }

    pub fn get_by_id(&self, id: &str) -> Option<Media> {
        self.items.with(|items| items.iter().find(|m| m.id == id).cloned())
    }

    pub fn is_loading(&self) -> Observable<bool> {
        self.is_loading.observable()
    }

    pub fn error_message(&self) -> Observable<String> {
        self.error_message.observable()
    }

    pub fn loading_now(&self) -> bool {
        self.is_loading.get()
    }

    pub fn error_now(&self) -> String {
        self.error_message.get()
    }
}
