// src/main.rs
use std::env;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cinelist::app::catalog::JsonCatalogSource;
use cinelist::app::prefetch::PosterLoader;
use cinelist::app::store::{KeyValueStore, MemoryStore, SqliteStore};
use cinelist::app::CineApp;
use cinelist::config::load_config;

fn pick_renderer() -> eframe::Renderer {
    match env::var("CINELIST_RENDERER").as_deref() {
        Ok("glow") => eframe::Renderer::Glow,
        Ok("wgpu") => eframe::Renderer::Wgpu,
        _ => {
            // Default: Windows = WGPU (DX12), Others = Glow (GL)
            #[cfg(target_os = "windows")]
            { eframe::Renderer::Wgpu }
            #[cfg(not(target_os = "windows"))]
            { eframe::Renderer::Glow }
        }
    }
}

fn open_store(path: &std::path::Path) -> Rc<dyn KeyValueStore> {
    match SqliteStore::open(path) {
        Ok(store) => {
            info!("Using store at {}", path.display());
            Rc::new(store)
        }
        Err(e) => {
            warn!(
                "Failed to open store {} ({e}); favorites and login will not survive a restart.",
                path.display()
            );
            Rc::new(MemoryStore::new())
        }
    }
}

fn main() -> eframe::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let config = load_config();
    info!("Catalog source: {}", config.catalog_source);

    let options = eframe::NativeOptions {
        renderer: pick_renderer(),
        multisampling: 0,
        ..Default::default()
    };

    match eframe::run_native(
        "cinelist",
        options,
        Box::new(move |_cc| {
            let store = open_store(&config.store_path);
            let source = Arc::new(JsonCatalogSource::new(config.catalog_source.clone()));
            let posters = PosterLoader::start(config.cache_dir.clone(), config.poster_workers);
            Ok(Box::new(CineApp::new(config, store, source, posters)))
        }),
    ) {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("eframe failed to start: {e:?}");
            error!("Hint: on WSL use X/Wayland; on Windows try CINELIST_RENDERER=wgpu or glow.");
            Err(e)
        }
    }
}
