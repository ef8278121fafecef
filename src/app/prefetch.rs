// src/app/prefetch.rs: background poster downloads + lazy texture upload
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use eframe::egui::{self as eg, TextureHandle};
use tracing::{debug, warn};

use super::cache::{ensure_local_image, load_rgba_image, poster_cache_dir, prune_poster_cache_in_dir};
use super::types::{PosterDone, PosterState};

const RESIZE_MAX_W: u32 = 480;
const RESIZE_QUALITY: u8 = 80;
const MAX_DONE_PER_FRAME: usize = 12;
const MAX_UPLOADS_PER_FRAME: usize = 4;

struct PosterSlot {
    state: PosterState,
    path: Option<PathBuf>,
    tex: Option<TextureHandle>, // UI thread only
}

pub struct PosterLoader {
    work_tx: Option<Sender<String>>,
    done_rx: Option<Receiver<PosterDone>>,
    slots: HashMap<String, PosterSlot>,
    uploads_left: usize,
}

impl PosterLoader {
    pub fn start(cache_dir: PathBuf, workers: usize) -> Self {
        let poster_dir = poster_cache_dir(&cache_dir);
        match prune_poster_cache_in_dir(&poster_dir) {
            Ok(n) if n > 0 => debug!("pruned {n} stale posters"),
            Ok(_) => {}
            Err(e) => warn!("poster cache prune failed: {e}"),
        }

        let client = match reqwest::blocking::Client::builder()
            .user_agent("cinelist/posters")
            .timeout(Duration::from_secs(20))
            .build()
        {
            Ok(c) => Arc::new(c),
            Err(e) => {
                warn!("http client build failed: {e}; posters disabled");
                return Self::disabled();
            }
        };

        let (work_tx, work_rx) = mpsc::channel::<String>();
        let (done_tx, done_rx) = mpsc::channel::<PosterDone>();
        let work_rx = Arc::new(Mutex::new(work_rx));

        for _ in 0..workers.max(1) {
            let work_rx = Arc::clone(&work_rx);
            let done_tx = done_tx.clone();
            let client = Arc::clone(&client);
            let poster_dir = poster_dir.clone();

            std::thread::spawn(move || loop {
                let job = match work_rx.lock() {
                    Ok(rx) => rx.recv(),
                    Err(_) => break,
                };
                let Ok(location) = job else {
                    break;
                };
                let result = ensure_local_image(
                    &client,
                    &poster_dir,
                    &location,
                    RESIZE_MAX_W,
                    RESIZE_QUALITY,
                );
                if done_tx.send(PosterDone { location, result }).is_err() {
                    break;
                }
            });
        }

        Self {
            work_tx: Some(work_tx),
            done_rx: Some(done_rx),
            slots: HashMap::new(),
            uploads_left: MAX_UPLOADS_PER_FRAME,
        }
    }

    pub fn disabled() -> Self {
        Self {
            work_tx: None,
            done_rx: None,
            slots: HashMap::new(),
            uploads_left: 0,
        }
    }

    /// Call once at the top of every frame.
    pub fn begin_frame(&mut self, ctx: &eg::Context) {
        self.uploads_left = MAX_UPLOADS_PER_FRAME;

        let mut drained = 0usize;
        while drained < MAX_DONE_PER_FRAME {
            let Some(rx) = &self.done_rx else {
                break;
            };
            match rx.try_recv() {
                Ok(msg) => {
                    drained += 1;
                    let Some(slot) = self.slots.get_mut(&msg.location) else {
                        continue;
                    };
                    match msg.result {
                        Ok(path) => {
                            slot.path = Some(path);
                            slot.state = PosterState::Cached; // uploaded lazily during paint
                        }
                        Err(e) => {
                            debug!("poster unavailable: {e}");
                            slot.state = PosterState::Failed;
                        }
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if drained > 0 {
            ctx.request_repaint();
        }
    }

    /// Texture for `location`, queueing the download on first sight.
    pub fn texture(&mut self, ctx: &eg::Context, location: &str) -> Option<TextureHandle> {
        if !self.slots.contains_key(location) {
            let Some(tx) = &self.work_tx else {
                return None;
            };
            let state = if tx.send(location.to_string()).is_ok() {
                PosterState::Pending
            } else {
                PosterState::Failed
            };
            self.slots.insert(
                location.to_string(),
                PosterSlot {
                    state,
                    path: None,
                    tex: None,
                },
            );
            return None;
        }

        let can_upload = self.uploads_left > 0;
        let slot = self.slots.get_mut(location)?;
        match slot.state {
            PosterState::Ready => slot.tex.clone(),
            PosterState::Cached if can_upload => {
                self.uploads_left -= 1;
                let path = slot.path.clone()?;
                match load_rgba_image(&path) {
                    Ok((w, h, bytes)) => {
                        let img = eg::ColorImage::from_rgba_unmultiplied(
                            [w as usize, h as usize],
                            &bytes,
                        );
                        let tex = ctx.load_texture(location.to_string(), img, eg::TextureOptions::LINEAR);
                        slot.tex = Some(tex.clone());
                        slot.state = PosterState::Ready;
                        Some(tex)
                    }
                    Err(e) => {
                        warn!("poster decode failed: {e}");
                        slot.state = PosterState::Failed;
                        None
                    }
                }
            }
            PosterState::Cached => {
                ctx.request_repaint();
                None
            }
            PosterState::Pending | PosterState::Failed => None,
        }
    }
}
