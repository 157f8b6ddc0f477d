//! Build step: compile published registry records into the runtime
//! `AssetLoader` module.
//!
//! The manifest is derived data. It is never read back; the registry stays
//! the single source of truth and the module goes stale until the next
//! explicit rebuild.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use asset_ledger_core::{Category, LedgerError};
use asset_ledger_store::RegistryOverlay;
use asset_ledger_store::json::write_atomic;
use serde::Serialize;

use crate::project::{AudioEntry, ManifestConfig};

/// Raw-marker token a published image path must never carry.
const RAW_MARKER: &str = "_original";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub base_path: String,
    pub placeholder: String,
    pub images: BTreeMap<String, String>,
    pub audio: BTreeMap<String, AudioEntry>,
}

impl Manifest {
    /// URL the runtime would load for `id`. Unknown ids and unprocessed
    /// (`_original`) paths resolve to the placeholder.
    pub fn get_path(&self, id: &str) -> String {
        match self.images.get(id) {
            Some(path) if !path.contains(RAW_MARKER) => format!("{}{}", self.base_path, path),
            _ => format!("{}{}", self.base_path, self.placeholder),
        }
    }

    /// Whether `id` resolves to its own image rather than the placeholder.
    pub fn resolves(&self, id: &str) -> bool {
        self.images
            .get(id)
            .is_some_and(|path| !path.contains(RAW_MARKER))
    }

    pub fn get_audio(&self, id: &str) -> Option<AudioEntry> {
        self.audio.get(id).map(|entry| AudioEntry {
            path: format!("{}{}", self.base_path, entry.path),
            volume: entry.volume,
        })
    }

    /// Render the JavaScript module. Output depends only on the manifest
    /// contents, so unchanged inputs give byte-identical files.
    pub fn render_module(&self) -> String {
        let base = js_string(&self.base_path);
        let placeholder = js_string(&format!("{}{}", self.base_path, self.placeholder));

        let images = self
            .images
            .iter()
            .map(|(id, path)| format!("            {}: {{ \"path\": {} }}", js_string(id), js_string(path)))
            .collect::<Vec<_>>()
            .join(",\n");
        let audio = self
            .audio
            .iter()
            .map(|(id, entry)| {
                format!(
                    "            {}: {{ \"path\": {}, \"volume\": {} }}",
                    js_string(id),
                    js_string(&entry.path),
                    serde_json::Value::from(entry.volume)
                )
            })
            .collect::<Vec<_>>()
            .join(",\n");

        let mut out = String::new();
        let _ = write!(
            out,
            r#"// Generated by asset-ledger. Do not edit; rebuild instead.
const AssetLoader = {{
    basePath: {base},
    placeholder: {placeholder},
    cache: new Map(),
    registries: {{
        images: {{
{images}
        }},
        audio: {{
{audio}
        }}
    }},

    getPath(id) {{
        const asset = this.registries.images[id];
        if (!asset) {{
            console.warn(`[AssetLoader] Image not found: ${{id}}, using placeholder`);
            return this.placeholder;
        }}
        if (asset.path.includes('{raw}')) {{
            console.error(`[AssetLoader] Blocked unprocessed asset: ${{asset.path}}`);
            return this.placeholder;
        }}
        return this.basePath + asset.path;
    }},

    get(id) {{
        return this.cache.get(id) || null;
    }},

    preload(id) {{
        if (this.cache.has(id)) return Promise.resolve(this.cache.get(id));
        return new Promise((resolve) => {{
            const img = new Image();
            img.onload = () => {{ this.cache.set(id, img); resolve(img); }};
            img.onerror = () => {{
                const fallback = new Image();
                fallback.onload = () => {{ this.cache.set(id, fallback); resolve(fallback); }};
                fallback.onerror = () => resolve(null);
                fallback.src = this.placeholder;
            }};
            img.src = this.getPath(id);
        }});
    }},

    getAudio(id) {{
        const asset = this.registries.audio[id];
        if (!asset) return null;
        return {{ path: this.basePath + asset.path, volume: asset.volume ?? 1 }};
    }},

    getImagePath(id) {{ return this.getPath(id); }},
    getImage(id) {{ return this.get(id); }},
    preloadImage(id) {{ return this.preload(id); }}
}};

window.AssetLoader = AssetLoader;
"#,
            raw = RAW_MARKER,
        );
        out
    }
}

fn js_string(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

/// Collects published registry records into a [`Manifest`].
pub struct ManifestBuilder<'a> {
    registry: &'a RegistryOverlay,
    config: &'a ManifestConfig,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(registry: &'a RegistryOverlay, config: &'a ManifestConfig) -> Self {
        Self { registry, config }
    }

    /// Scan every registry category. Unreadable records are skipped by the
    /// scan; only a failure to list the registry itself is an error.
    pub fn collect(&self) -> Result<Manifest, LedgerError> {
        let mut images: BTreeMap<String, String> = BTreeMap::new();
        let mut audio: BTreeMap<String, AudioEntry> = BTreeMap::new();
        let mut sources: BTreeMap<String, Category> = BTreeMap::new();

        for category in self.registry.categories()? {
            let report = self.registry.load_category(category)?;
            for record in report.records {
                if !record.status.is_published() {
                    continue;
                }
                if let Some(first) = sources.get(&record.id) {
                    log::warn!(
                        "Manifest: '{}' in {} shadowed by {}",
                        record.id,
                        category,
                        first
                    );
                    continue;
                }

                if category.is_audio() {
                    let Some(path) = record.path.as_deref().or(record.files.clean.as_deref()) else {
                        log::debug!("Manifest: audio '{}' has no path", record.id);
                        continue;
                    };
                    audio.insert(
                        record.id.clone(),
                        AudioEntry {
                            path: self.config.strip_prefix(path).to_string(),
                            volume: record.volume.unwrap_or(1.0),
                        },
                    );
                } else {
                    let Some(path) = record.files.clean.as_deref() else {
                        log::debug!("Manifest: '{}' has no processed file", record.id);
                        continue;
                    };
                    images.insert(record.id.clone(), self.config.strip_prefix(path).to_string());
                }
                sources.insert(record.id, category);
            }
        }

        for (id, path) in &self.config.essential_images {
            images.entry(id.clone()).or_insert_with(|| path.clone());
        }
        for (id, entry) in &self.config.essential_audio {
            audio.entry(id.clone()).or_insert_with(|| entry.clone());
        }

        Ok(Manifest {
            base_path: self.config.base_path.clone(),
            placeholder: self.config.placeholder.clone(),
            images,
            audio,
        })
    }
}

/// What a rebuild produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildSummary {
    pub images: usize,
    pub audio: usize,
    pub output: PathBuf,
    /// False when the module on disk already had these exact contents
    pub changed: bool,
}

/// Render `manifest` to `path`. An identical existing file is left alone.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<BuildSummary, LedgerError> {
    let rendered = manifest.render_module();
    let changed = match fs::read(path) {
        Ok(existing) => existing != rendered.as_bytes(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => return Err(LedgerError::io(path.display().to_string(), e)),
    };
    if changed {
        write_atomic(path, rendered.as_bytes())?;
        log::info!(
            "Manifest: wrote {} ({} images, {} audio)",
            path.display(),
            manifest.images.len(),
            manifest.audio.len()
        );
    } else {
        log::debug!("Manifest: {} unchanged", path.display());
    }
    Ok(BuildSummary {
        images: manifest.images.len(),
        audio: manifest.audio.len(),
        output: path.to_path_buf(),
        changed,
    })
}
