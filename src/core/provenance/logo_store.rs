//! 参考 logo 库 - 启动时加载一次，之后只读

use crate::core::error::LogoStoreError;
use image::RgbaImage;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const LOGO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

#[derive(Debug, Clone)]
pub struct ReferenceLogo {
    pub provider: String,
    /// File name, or a caller-chosen label for in-memory logos.
    pub label: String,
    /// Alpha channel doubles as the match mask.
    pub image: RgbaImage,
}

#[derive(Debug, Default)]
pub struct LogoStore {
    logos: BTreeMap<String, Vec<ReferenceLogo>>,
    missing: Vec<String>,
}

impl LogoStore {
    /// Loads `<provider>_logo.<ext>` and `<provider>_logo_<n>.<ext>` for every
    /// provider. Providers without a usable file stay unmatchable.
    pub fn load<S: AsRef<str>>(dir: impl AsRef<Path>, providers: &[S]) -> Result<Self, LogoStoreError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(LogoStoreError::DirectoryMissing(dir.display().to_string()));
        }

        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        let mut store = LogoStore::default();
        for provider in providers {
            let provider = provider.as_ref();
            let variants: Vec<ReferenceLogo> = files
                .iter()
                .filter(|path| is_variant_of(path, provider))
                .filter_map(|path| decode_logo(provider, path))
                .collect();

            if variants.is_empty() {
                warn!("⚠️ No reference logo for provider '{}', it will be unmatchable", provider);
                store.missing.push(provider.to_string());
            } else {
                debug!("🖼️ {} reference logo(s) for '{}'", variants.len(), provider);
                store.logos.insert(provider.to_string(), variants);
            }
        }

        info!(
            "🖼️ Logo store loaded from {}: {} provider(s), {} missing",
            dir.display(),
            store.logos.len(),
            store.missing.len()
        );
        Ok(store)
    }

    pub fn from_logos(logos: impl IntoIterator<Item = ReferenceLogo>) -> Self {
        let mut store = LogoStore::default();
        for logo in logos {
            store.logos.entry(logo.provider.clone()).or_default().push(logo);
        }
        store
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.logos.keys().map(String::as_str)
    }

    pub fn variants(&self, provider: &str) -> &[ReferenceLogo] {
        self.logos.get(provider).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_matchable(&self, provider: &str) -> bool {
        !self.variants(provider).is_empty()
    }

    pub fn missing_providers(&self) -> &[String] {
        &self.missing
    }

    pub fn is_empty(&self) -> bool {
        self.logos.is_empty()
    }
}

fn is_variant_of(path: &Path, provider: &str) -> bool {
    let extension_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| LOGO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
    if !extension_ok {
        return false;
    }
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    let stem = stem.to_ascii_lowercase();
    let Some(rest) = stem.strip_prefix(&format!("{}_logo", provider.to_ascii_lowercase())) else {
        return false;
    };
    match rest.strip_prefix('_') {
        None => rest.is_empty(),
        Some(n) => !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()),
    }
}

fn decode_logo(provider: &str, path: &Path) -> Option<ReferenceLogo> {
    match image::open(path) {
        Ok(img) => {
            let image = img.to_rgba8();
            if image.width() == 0 || image.height() == 0 {
                warn!("⚠️ Reference logo {} is empty, skipped", path.display());
                return None;
            }
            Some(ReferenceLogo {
                provider: provider.to_string(),
                label: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                image,
            })
        }
        Err(e) => {
            warn!("⚠️ Failed to decode reference logo {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    fn write_logo(dir: &Path, name: &str) {
        RgbaImage::from_pixel(8, 4, Rgba([200, 10, 10, 255]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_variant_names() {
        assert!(is_variant_of(Path::new("/x/sora_logo.png"), "sora"));
        assert!(is_variant_of(Path::new("/x/sora_logo_2.PNG"), "sora"));
        assert!(!is_variant_of(Path::new("/x/sora_logo_b.png"), "sora"));
        assert!(!is_variant_of(Path::new("/x/sora_logos.png"), "sora"));
        assert!(!is_variant_of(Path::new("/x/sora_logo.txt"), "sora"));
        assert!(!is_variant_of(Path::new("/x/pika_logo.png"), "sora"));
    }

    #[test]
    fn test_load_with_missing_provider() {
        let dir = tempdir().unwrap();
        write_logo(dir.path(), "sora_logo.png");
        write_logo(dir.path(), "sora_logo_1.png");
        write_logo(dir.path(), "runway_logo.png");
        fs::write(dir.path().join("pika_logo.png"), b"not a png").unwrap();

        let store = LogoStore::load(dir.path(), &["sora", "runway", "pika", "luma"]).unwrap();
        assert_eq!(store.variants("sora").len(), 2);
        assert!(store.is_matchable("runway"));
        assert!(!store.is_matchable("pika"));
        assert_eq!(store.missing_providers(), &["pika".to_string(), "luma".to_string()]);
        assert_eq!(store.providers().collect::<Vec<_>>(), vec!["runway", "sora"]);
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            LogoStore::load(&missing, &["sora"]),
            Err(LogoStoreError::DirectoryMissing(_))
        ));
    }
}
