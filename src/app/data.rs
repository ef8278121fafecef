// src/app/data.rs
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaCategory {
    #[serde(rename = "pelicula", alias = "movie")]
    Movie,
    #[serde(rename = "serie", alias = "series")]
    Series,
}

impl MediaCategory {
    pub const ALL: [Self; 2] = [Self::Movie, Self::Series];

    /// Value used in the catalog document and in filter criteria.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "pelicula",
            Self::Series => "serie",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Movie => "Movie",
            Self::Series => "Series",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: String,
    #[serde(rename = "titulo", alias = "title")]
    pub title: String,
    #[serde(rename = "sipnosis", alias = "synopsis", default)]
    pub synopsis: String,
    #[serde(rename = "anio", alias = "year")]
    pub year: i32,
    #[serde(default)]
    pub director: String,
    #[serde(rename = "genero", alias = "genre", default)]
    pub genre: String,
    #[serde(rename = "categoria", alias = "category")]
    pub category: MediaCategory,
    #[serde(rename = "imagen", alias = "coverImageRef", default)]
    pub cover_image_ref: String,
    #[serde(rename = "imagenDetalle", alias = "detailImageRef", default)]
    pub detail_image_ref: String,
}

impl Media {
    pub fn title_line(&self) -> String {
        format!("{} ({})", self.title, self.year)
    }
}

/// Shape of the static catalog resource.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogDocument {
    #[serde(rename = "peliculas", alias = "movies", default)]
    pub movies: Vec<Media>,
    #[serde(default)]
    pub series: Vec<Media>,
}

impl CatalogDocument {
    pub fn parse(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|e| format!("invalid catalog document: {e}"))
    }

    /// Movies then series, keeping the first record for any repeated id.
    pub fn into_items(self) -> Vec<Media> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(self.movies.len() + self.series.len());
        for item in self.movies.into_iter().chain(self.series) {
            if seen.insert(item.id.clone()) {
                out.push(item);
            } else {
                warn!("duplicate media id `{}` in catalog; keeping the first one", item.id);
            }
        }
        out
    }
}
