//! Image sources for section cards
//!
//! URLs go straight to the egui loaders. Embedded `data:` images are decoded
//! once per content change and handed over as bytes.

use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use eframe::egui::{self, load::Bytes, ImageSource};

use crate::core::image::decode_data_url;

struct Decoded {
    hash: u64,
    uri: String,
    bytes: Option<Bytes>,
}

/// Decoded embedded images keyed by section id
#[derive(Default)]
pub struct ImageCache {
    decoded: HashMap<String, Decoded>,
    /// URIs no longer shown, still held by the egui loaders
    stale: Vec<String>,
}

impl ImageCache {
    /// Source for a section image, `None` when an embedded image is corrupt
    pub fn source(&mut self, section_id: &str, image: &str) -> Option<ImageSource<'static>> {
        if !image.starts_with("data:") {
            if let Some(old) = self.decoded.remove(section_id) {
                self.stale.push(old.uri);
            }
            return Some(ImageSource::Uri(Cow::Owned(image.to_string())));
        }

        let mut hasher = DefaultHasher::new();
        image.hash(&mut hasher);
        let hash = hasher.finish();

        let entry = self
            .decoded
            .entry(section_id.to_string())
            .or_insert_with(|| Decoded {
                hash: hash.wrapping_add(1),
                uri: String::new(),
                bytes: None,
            });

        if entry.hash != hash {
            entry.hash = hash;
            let uri = format!("bytes://section/{}/{:016x}", section_id, hash);
            let old = std::mem::replace(&mut entry.uri, uri);
            if !old.is_empty() {
                self.stale.push(old);
            }
            entry.bytes = match decode_data_url(image) {
                Some((_, bytes)) => Some(Bytes::from(bytes)),
                None => {
                    tracing::warn!("Section {} has an unreadable embedded image", section_id);
                    None
                }
            };
        }

        entry.bytes.clone().map(|bytes| ImageSource::Bytes {
            uri: Cow::Owned(entry.uri.clone()),
            bytes,
        })
    }

    /// Forget sections that no longer exist
    pub fn retain(&mut self, mut exists: impl FnMut(&str) -> bool) {
        let stale = &mut self.stale;
        self.decoded.retain(|id, entry| {
            let keep = exists(id);
            if !keep {
                stale.push(std::mem::take(&mut entry.uri));
            }
            keep
        });
    }

    /// Release replaced and removed images from the egui loaders
    pub fn forget_stale(&mut self, ctx: &egui::Context) {
        for uri in self.stale.drain(..) {
            tracing::debug!("Forgetting image {}", uri);
            ctx.forget_image(&uri);
        }
    }
}

/// Paint a section image
pub fn show_image(ui: &mut egui::Ui, source: ImageSource<'static>) {
    ui.add(
        egui::Image::new(source)
            .max_height(160.0)
            .corner_radius(egui::CornerRadius::same(8)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::image::encode_data_url;

    fn uri_of(source: &ImageSource<'static>) -> String {
        match source {
            ImageSource::Uri(uri) => uri.to_string(),
            ImageSource::Bytes { uri, .. } => uri.to_string(),
            ImageSource::Texture(_) => panic!("unexpected texture source"),
        }
    }

    #[test]
    fn test_url_passes_through() {
        let mut cache = ImageCache::default();
        let source = cache.source("profile", "https://example.com/a.png").unwrap();
        assert!(matches!(source, ImageSource::Uri(_)));
        assert_eq!(uri_of(&source), "https://example.com/a.png");
    }

    #[test]
    fn test_data_url_uri_tracks_content() {
        let mut cache = ImageCache::default();
        let first = encode_data_url("image/png", b"one");
        let second = encode_data_url("image/png", b"two");

        let a = cache.source("profile", &first).unwrap();
        let b = cache.source("profile", &first).unwrap();
        let c = cache.source("profile", &second).unwrap();

        assert!(matches!(a, ImageSource::Bytes { .. }));
        assert!(uri_of(&a).starts_with("bytes://section/profile/"));
        assert_eq!(uri_of(&a), uri_of(&b));
        assert_ne!(uri_of(&a), uri_of(&c));
    }

    #[test]
    fn test_corrupt_data_url_has_no_source() {
        let mut cache = ImageCache::default();
        assert!(cache.source("profile", "data:image/png;base64,%%%").is_none());
    }

    #[test]
    fn test_retain_drops_removed_sections() {
        let mut cache = ImageCache::default();
        cache.source("a", &encode_data_url("image/png", b"x"));
        let removed = uri_of(&cache.source("b", &encode_data_url("image/png", b"y")).unwrap());
        cache.retain(|id| id == "a");
        assert_eq!(cache.decoded.len(), 1);
        assert!(cache.decoded.contains_key("a"));
        assert_eq!(cache.stale, vec![removed]);
    }

    #[test]
    fn test_replaced_images_are_released() {
        let mut cache = ImageCache::default();
        let first = uri_of(&cache.source("a", &encode_data_url("image/png", b"one")).unwrap());
        assert!(cache.stale.is_empty());

        let second = uri_of(&cache.source("a", &encode_data_url("image/png", b"two")).unwrap());
        cache.source("a", &encode_data_url("image/png", b"two"));
        assert_eq!(cache.stale, vec![first.clone()]);

        cache.source("a", "https://example.com/a.png");
        assert_eq!(cache.stale, vec![first, second]);
        assert!(cache.decoded.is_empty());

        cache.forget_stale(&egui::Context::default());
        assert!(cache.stale.is_empty());
    }
}
