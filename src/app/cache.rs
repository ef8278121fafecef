use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use image::GenericImageView;
use reqwest::blocking::Client;
use reqwest::Url;
use tracing::warn;

use crate::app::catalog::is_remote;

const POSTER_RETENTION_DAYS: u64 = 30;
const POSTER_RETENTION_SECS: u64 = POSTER_RETENTION_DAYS * 24 * 60 * 60;

/// Create `<cache_dir>/posters`, falling back to the cache dir itself.
pub fn poster_cache_dir(cache_dir: &Path) -> PathBuf {
    let path = cache_dir.join("posters");
    if let Err(e) = fs::create_dir_all(&path) {
        warn!("failed to create poster cache dir {}: {e}", path.display());
        let _ = fs::create_dir_all(cache_dir);
        return cache_dir.to_path_buf();
    }
    path
}

pub fn prune_poster_cache_in_dir(dir: &Path) -> std::io::Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(POSTER_RETENTION_SECS))
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let mut removed = 0usize;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase());
        match ext.as_deref() {
            // leftovers from an interrupted write
            Some("part") => {
                let _ = fs::remove_file(&path);
                removed += 1;
                continue;
            }
            Some("jpg") => {}
            _ => continue,
        }
        let modified = entry
            .metadata()?
            .modified()
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if modified < cutoff {
            let _ = fs::remove_file(&path);
            removed += 1;
        }
    }
    Ok(removed)
}

pub fn url_to_cache_key(url: &str) -> String {
    format!("{:x}", md5::compute(url.as_bytes()))
}

/// Turn an image reference from the catalog into a fetchable location.
///
/// Absolute URLs pass through. Relative refs are resolved against the catalog
/// location: URL-joined for a remote catalog, or joined to the catalog file's
/// directory for a local one.
pub fn resolve_image_ref(catalog_location: &str, image_ref: &str) -> Option<String> {
    let image_ref = image_ref.trim();
    if image_ref.is_empty() {
        return None;
    }
    if is_remote(image_ref) {
        return Some(image_ref.to_string());
    }

    if is_remote(catalog_location) {
        let base = match Url::parse(catalog_location) {
            Ok(base) => base,
            Err(e) => {
                warn!("bad catalog url {catalog_location}: {e}");
                return None;
            }
        };
        return match base.join(image_ref) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                warn!("cannot resolve image ref `{image_ref}`: {e}");
                None
            }
        };
    }

    let base = Path::new(catalog_location)
        .parent()
        .unwrap_or_else(|| Path::new("."));
    Some(base.join(image_ref).to_string_lossy().into_owned())
}

/// Decode an image file into (width, height, RGBA8 bytes).
pub fn load_rgba_image(path: &Path) -> Result<(u32, u32, Vec<u8>), String> {
    let img = image::ImageReader::open(path)
        .map_err(|e| format!("open image {}: {e}", path.display()))?
        .with_guessed_format()
        .map_err(|e| format!("guess format {}: {e}", path.display()))?
        .decode()
        .map_err(|e| format!("decode {}: {e}", path.display()))?;
    let (w, h) = img.dimensions();
    Ok((w, h, img.to_rgba8().to_vec()))
}

/// Make `location` available on disk. Local files are used in place; remote
/// images are downloaded, resized to `max_width` and stored as JPEG under the
/// poster dir, keyed by the md5 of the URL.
pub fn ensure_local_image(
    client: &Client,
    poster_dir: &Path,
    location: &str,
    max_width: u32,
    quality: u8,
) -> Result<PathBuf, String> {
    if !is_remote(location) {
        let p = PathBuf::from(location);
        return if p.is_file() {
            Ok(p)
        } else {
            Err(format!("image not found: {location}"))
        };
    }

    let key = url_to_cache_key(location);
    let dest = poster_dir.join(format!("{key}.jpg"));
    if dest.exists() {
        return Ok(dest);
    }

    let bytes = client
        .get(location)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .map_err(|e| format!("download {location}: {e}"))?;

    let img = image::load_from_memory(&bytes).map_err(|e| format!("decode {location}: {e}"))?;
    let (w, h) = img.dimensions();
    let out = if w > max_width {
        let new_h = ((h as f32) * (max_width as f32 / w as f32))
            .round()
            .max(1.0) as u32;
        img.resize_exact(max_width, new_h, image::imageops::FilterType::CatmullRom)
    } else {
        img
    };

    let mut jpeg_bytes: Vec<u8> = Vec::new();
    {
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_bytes, quality);
        out.to_rgb8()
            .write_with_encoder(encoder)
            .map_err(|e| format!("jpeg encode: {e}"))?;
    }

    let tmp = dest.with_extension("jpg.part");
    {
        let mut f = fs::File::create(&tmp).map_err(|e| format!("create tmp: {e}"))?;
        f.write_all(&jpeg_bytes)
            .map_err(|e| format!("write: {e}"))?;
    }
    fs::rename(&tmp, &dest).map_err(|e| format!("rename: {e}"))?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    fn write_png(img: &image::DynamicImage, dest: &Path) {
        let mut png_bytes: Vec<u8> = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
            .unwrap();
        fs::write(dest, png_bytes).unwrap();
    }

    #[test]
    fn cache_key_is_stable_md5() {
        assert_eq!(url_to_cache_key(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(url_to_cache_key("a"), url_to_cache_key("a"));
        assert_ne!(url_to_cache_key("a"), url_to_cache_key("b"));
    }

    #[test]
    fn resolves_refs_against_remote_catalog() {
        let base = "https://cdn.example.com/assets/media.json";
        assert_eq!(
            resolve_image_ref(base, "img/El Padrino.jpg").as_deref(),
            Some("https://cdn.example.com/assets/img/El%20Padrino.jpg")
        );
        assert_eq!(
            resolve_image_ref(base, "/static/a.png").as_deref(),
            Some("https://cdn.example.com/static/a.png")
        );
        assert_eq!(
            resolve_image_ref(base, "http://other.org/x.jpg").as_deref(),
            Some("http://other.org/x.jpg")
        );
        assert_eq!(resolve_image_ref(base, "  "), None);
    }

    #[test]
    fn resolves_refs_against_host_only_catalog_url() {
        assert_eq!(
            resolve_image_ref("https://cdn.example.com", "img/p1.jpg").as_deref(),
            Some("https://cdn.example.com/img/p1.jpg")
        );
    }

    #[test]
    fn catalog_query_string_is_not_a_directory() {
        assert_eq!(
            resolve_image_ref("https://cdn.example.com/a/media.json?v=1/2", "img/p1.jpg").as_deref(),
            Some("https://cdn.example.com/a/img/p1.jpg")
        );
    }

    #[test]
    fn resolves_refs_against_local_catalog() {
        let resolved = resolve_image_ref("assets/media.json", "img/p1.jpg").unwrap();
        assert_eq!(PathBuf::from(resolved), Path::new("assets").join("img/p1.jpg"));
    }

    #[test]
    fn local_png_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            3,
            2,
            image::Rgba([10, 20, 30, 255]),
        ));
        write_png(&img, &path);

        let client = Client::new();
        let local = ensure_local_image(&client, dir.path(), &path.to_string_lossy(), 320, 75)
            .unwrap();
        let (w, h, bytes) = load_rgba_image(&local).unwrap();
        assert_eq!((w, h), (3, 2));
        assert_eq!(bytes.len(), 3 * 2 * 4);
        assert_eq!(&bytes[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn missing_local_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let client = Client::new();
        let missing = dir.path().join("none.jpg");
        assert!(ensure_local_image(&client, dir.path(), &missing.to_string_lossy(), 320, 75)
            .is_err());
    }

    #[test]
    fn prune_removes_partial_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg.part"), b"x").unwrap();
        fs::write(dir.path().join("b.jpg"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("old.rgba"), b"x").unwrap();
        assert_eq!(prune_poster_cache_in_dir(dir.path()).unwrap(), 1);
        assert!(dir.path().join("old.rgba").exists());
        assert!(dir.path().join("b.jpg").exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
