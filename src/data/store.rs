//! Model store layout and the one-time bootstrap download.
//!
//! Layout:
//!
//! ```text
//! <root>/models_v2/fr.json
//! <root>/models_v2/musigma_nonlinearboost.json
//! <root>/models_v3/...
//! ```
//!
//! Nothing here runs implicitly: callers invoke `ensure_model_store` before
//! building a facade. It is idempotent; a schema directory that already holds
//! networks is never re-downloaded. Archives are unpacked into a staging
//! directory and moved into place only once they check out, so a failed
//! install leaves no partial schema directory behind.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::domain::{ModelFamily, SchemaVersion};
use crate::emu::model_files;
use crate::error::EmuError;

/// Store root used when `MGEMU_MODEL_DIR` is not set.
pub const DEFAULT_STORE_DIR: &str = "mgemu_data";

const ENV_MODEL_DIR: &str = "MGEMU_MODEL_DIR";
const ENV_URL_V2: &str = "MGEMU_DATA_URL_V2";
const ENV_URL_V3: &str = "MGEMU_DATA_URL_V3";

/// Where the store lives and where to fetch it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub root: PathBuf,
    pub url_v2: Option<String>,
    pub url_v3: Option<String>,
}

impl StoreConfig {
    /// Read `.env` and the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let root = non_empty_env(ENV_MODEL_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR));
        Self {
            root,
            url_v2: non_empty_env(ENV_URL_V2),
            url_v3: non_empty_env(ENV_URL_V3),
        }
    }

    /// Store at `root` with no archive locations.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            url_v2: None,
            url_v3: None,
        }
    }

    pub fn archive_url(&self, schema: SchemaVersion) -> Option<&str> {
        match schema {
            SchemaVersion::V2 => self.url_v2.as_deref(),
            SchemaVersion::V3 => self.url_v3.as_deref(),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Read-only view of a model store directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn schema_dir(&self, schema: SchemaVersion) -> PathBuf {
        self.root.join(schema.dir_name())
    }

    /// Path of the network file `file` (without extension) for `schema`.
    pub fn model_path(&self, schema: SchemaVersion, file: &str) -> PathBuf {
        self.schema_dir(schema).join(format!("{file}.json"))
    }

    /// Families whose every network file exists for `schema`.
    pub fn available_families(&self, schema: SchemaVersion) -> Vec<ModelFamily> {
        families_in(&self.schema_dir(schema), schema)
    }

    /// True when the schema directory holds networks for at least one family.
    pub fn is_present(&self, schema: SchemaVersion) -> bool {
        !self.available_families(schema).is_empty()
    }
}

fn families_in(dir: &Path, schema: SchemaVersion) -> Vec<ModelFamily> {
    ModelFamily::ALL
        .into_iter()
        .filter(|&family| match model_files(family, schema) {
            Ok(files) => files
                .iter()
                .all(|(_, file)| dir.join(format!("{file}.json")).is_file()),
            Err(_) => false,
        })
        .collect()
}

/// Make sure the networks for `schema` exist under `config.root`.
///
/// Downloads and unpacks the configured archive when the schema directory
/// holds no networks; otherwise does nothing. The downloaded archive is
/// removed whether or not the install succeeds.
pub fn ensure_model_store(config: &StoreConfig, schema: SchemaVersion) -> Result<ModelStore, EmuError> {
    let store = ModelStore::new(&config.root);
    if store.is_present(schema) {
        debug!(dir = %store.schema_dir(schema).display(), "model store already present");
        return Ok(store);
    }

    let url = config.archive_url(schema).ok_or_else(|| {
        EmuError::Store(format!(
            "{} has no networks and no archive URL is configured for schema {} \
             (set {} or run `mgemu fetch --archive <zip>`)",
            store.schema_dir(schema).display(),
            schema.tag(),
            match schema {
                SchemaVersion::V2 => ENV_URL_V2,
                SchemaVersion::V3 => ENV_URL_V3,
            }
        ))
    })?;

    fs::create_dir_all(&config.root).map_err(|e| {
        EmuError::Store(format!("failed to create {}: {e}", config.root.display()))
    })?;

    let archive_path = config.root.join(format!("{}.zip", schema.dir_name()));
    info!(%url, "first use of the emulator: downloading {}", schema.dir_name());
    let result = download(url, &archive_path).and_then(|()| {
        info!("download finished, extracting files");
        install_archive(&store, schema, &archive_path)
    });

    if archive_path.exists() {
        if let Err(e) = fs::remove_file(&archive_path) {
            warn!(path = %archive_path.display(), "failed to remove archive: {e}");
        }
    }
    result?;

    Ok(store)
}

/// Unpack a local archive into the store.
///
/// The archive's `models_<schema>/` directory must hold the JSON networks of
/// at least one family; it replaces any existing schema directory. Returns
/// the number of files extracted.
pub fn install_archive(store: &ModelStore, schema: SchemaVersion, archive: &Path) -> Result<usize, EmuError> {
    let root = store.root();
    fs::create_dir_all(root)
        .map_err(|e| EmuError::Store(format!("failed to create {}: {e}", root.display())))?;

    let staging = root.join(format!(".{}.staging", schema.dir_name()));
    remove_dir_if_exists(&staging)?;

    let result = extract_archive(archive, &staging).and_then(|n| {
        let families = families_in(&staging.join(schema.dir_name()), schema);
        if families.is_empty() {
            return Err(EmuError::Store(format!(
                "archive {} has no JSON networks under {}/",
                archive.display(),
                schema.dir_name()
            )));
        }
        debug!(families = ?families, "archive networks found");

        let target = store.schema_dir(schema);
        remove_dir_if_exists(&target)?;
        fs::rename(staging.join(schema.dir_name()), &target).map_err(|e| {
            EmuError::Store(format!("failed to move networks into {}: {e}", target.display()))
        })?;
        Ok(n)
    });

    if let Err(e) = fs::remove_dir_all(&staging) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %staging.display(), "failed to remove staging directory: {e}");
        }
    }

    let n = result?;
    info!(files = n, dir = %store.schema_dir(schema).display(), "model store ready");
    Ok(n)
}

fn remove_dir_if_exists(dir: &Path) -> Result<(), EmuError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(EmuError::Store(format!("failed to remove {}: {e}", dir.display()))),
    }
}

/// Extract every entry of a zip archive below `dest`. Returns the file count.
///
/// Entries whose path would escape `dest` are skipped.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<usize, EmuError> {
    let file = File::open(archive)
        .map_err(|e| EmuError::Store(format!("failed to open {}: {e}", archive.display())))?;
    let mut zip = ZipArchive::new(file)
        .map_err(|e| EmuError::Store(format!("invalid archive {}: {e}", archive.display())))?;

    let mut written = 0;
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| EmuError::Store(format!("failed to read archive entry {i}: {e}")))?;
        let Some(rel) = entry.enclosed_name().map(Path::to_path_buf) else {
            warn!(entry = entry.name(), "skipping archive entry with unsafe path");
            continue;
        };
        let out_path = dest.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| {
                EmuError::Store(format!("failed to create {}: {e}", out_path.display()))
            })?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EmuError::Store(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let mut out = File::create(&out_path)
            .map_err(|e| EmuError::Store(format!("failed to create {}: {e}", out_path.display())))?;
        io::copy(&mut entry, &mut out)
            .map_err(|e| EmuError::Store(format!("failed to write {}: {e}", out_path.display())))?;
        written += 1;
    }
    Ok(written)
}

fn download(url: &str, dest: &Path) -> Result<(), EmuError> {
    let mut resp = Client::new()
        .get(url)
        .send()
        .map_err(|e| EmuError::Store(format!("download request failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(EmuError::Store(format!(
            "download failed with status {}",
            resp.status()
        )));
    }

    let mut file = File::create(dest)
        .map_err(|e| EmuError::Store(format!("failed to create {}: {e}", dest.display())))?;
    resp.copy_to(&mut file)
        .map_err(|e| EmuError::Store(format!("failed to save archive: {e}")))?;
    Ok(())
}
