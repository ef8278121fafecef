// src/app/types.rs
use std::path::PathBuf;

use super::data::Media;

// ---- cross-thread messages ----
pub enum CatalogMsg {
    Done(Vec<Media>),
    Error(String),
}

/// (image ref as resolved location, cached path or reason)
pub struct PosterDone {
    pub location: String,
    pub result: Result<PathBuf, String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PosterState {
    Pending, // queued or downloading
    Cached,  // file present on disk (ready to upload)
    Ready,   // texture uploaded
    Failed,  // permanent failure
}

/// What a media card asked for this frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardAction {
    Open(String),
    ToggleFavorite(String),
    RequestRemove(String),
}
