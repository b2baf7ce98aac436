//! Image records and the default seed collection

use std::fmt;
use std::sync::Arc;

/// Unique identifier of an image record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageId(pub String);

impl ImageId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Fresh random identifier for uploaded images
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the image bytes come from
#[derive(Clone)]
pub enum ImageSource {
    /// Fetched over HTTP(S)
    Remote(String),
    /// Held in memory (uploaded files)
    Inline { bytes: Arc<[u8]>, mime: String },
}

impl ImageSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, ImageSource::Remote(_))
    }

    /// Short description for logs
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Remote(url) => url.clone(),
            ImageSource::Inline { bytes, mime } => format!("inline {} ({} bytes)", mime, bytes.len()),
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// A displayable image and its metadata. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub id: ImageId,
    pub source: ImageSource,
    pub alt_text: String,
    pub category: String,
    pub display_name: String,
    pub size_bytes: Option<u64>,
}

impl ImageRecord {
    pub fn remote(id: &str, url: &str, alt: &str, category: &str, name: &str) -> Self {
        Self {
            id: ImageId::new(id),
            source: ImageSource::Remote(url.to_string()),
            alt_text: alt.to_string(),
            category: category.to_string(),
            display_name: name.to_string(),
            size_bytes: None,
        }
    }
}

const PEXELS_QUERY: &str = "?auto=compress&cs=tinysrgb&w=800";

fn pexels(photo: u32) -> String {
    format!(
        "https://images.pexels.com/photos/{photo}/pexels-photo-{photo}.jpeg{PEXELS_QUERY}"
    )
}

/// The collection shown on startup
pub fn default_images() -> Vec<ImageRecord> {
    [
        ("1", 3408744, "Mountain landscape", "Nature", "Mountain Vista"),
        ("2", 3075993, "City skyline", "Urban", "City Lights"),
        ("3", 1323550, "Ocean waves", "Nature", "Ocean Waves"),
        ("4", 2662116, "Forest path", "Nature", "Forest Path"),
        ("5", 3184291, "Urban architecture", "Urban", "Modern Architecture"),
        ("6", 1761279, "Abstract art", "Art", "Abstract Colors"),
        ("7", 2080696, "Vintage camera", "Art", "Vintage Camera"),
        ("8", 3184338, "Sunset landscape", "Nature", "Golden Sunset"),
    ]
    .into_iter()
    .map(|(id, photo, alt, category, name)| ImageRecord::remote(id, &pexels(photo), alt, category, name))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_collection() {
        let images = default_images();
        assert_eq!(images.len(), 8);
        assert_eq!(images[0].display_name, "Mountain Vista");
        assert!(images.iter().all(|i| i.source.is_remote()));

        let ids: std::collections::HashSet<_> = images.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn test_seed_urls() {
        let images = default_images();
        match &images[1].source {
            ImageSource::Remote(url) => assert_eq!(
                url,
                "https://images.pexels.com/photos/3075993/pexels-photo-3075993.jpeg?auto=compress&cs=tinysrgb&w=800"
            ),
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ImageId::generate(), ImageId::generate());
    }
}
