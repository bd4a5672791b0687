use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use directories::ProjectDirs;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, warn};

use crate::scores::{HighScoreRecord, ScoreBook};

type HmacSha256 = Hmac<Sha256>;

const SECRET_KEY: &[u8] = b"tmemory_scores_key_v1_no_peeking";
const HMAC_SIZE: usize = 32;
const FILE_NAME: &str = "scores.dat";
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Bumped whenever the payload layout changes; older files are discarded.
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not encode save data: {0}")]
    Encode(#[from] bincode::Error),
    #[error("signing key rejected")]
    Key,
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Everything persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub scores: BTreeMap<String, Vec<HighScoreRecord>>,
    pub player_name: Option<String>,
    pub device_id: Option<String>,
}

impl Default for SaveData {
    fn default() -> Self {
        SaveData {
            version: SAVE_VERSION,
            scores: BTreeMap::new(),
            player_name: None,
            device_id: None,
        }
    }
}

impl SaveData {
    pub fn score_book(&self) -> ScoreBook {
        ScoreBook::from_entries(self.scores.clone())
    }

    /// The stored device id, generating one on first use.
    pub fn device_id<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &str {
        self.device_id
            .get_or_insert_with(|| generate_device_id(rng, now_millis()))
    }
}

/// Loads and saves [`SaveData`]. Loading never fails: anything unreadable
/// yields a fresh default.
pub trait Store {
    fn load(&self) -> SaveData;
    fn save(&self, data: &SaveData) -> Result<(), StoreError>;
}

/// HMAC-signed bincode file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: &Path) -> Self {
        FileStore {
            path: dir.join(FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Option<SaveData> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no save file yet");
            return None;
        }

        let mut data = Vec::new();
        if let Err(err) = File::open(&self.path).and_then(|mut f| f.read_to_end(&mut data)) {
            warn!(path = %self.path.display(), %err, "could not read save file");
            return None;
        }

        if data.len() < HMAC_SIZE {
            warn!(path = %self.path.display(), len = data.len(), "save file truncated");
            return None;
        }

        let (payload, signature) = data.split_at(data.len() - HMAC_SIZE);
        let mut mac = HmacSha256::new_from_slice(SECRET_KEY).ok()?;
        mac.update(payload);
        if mac.verify_slice(signature).is_err() {
            warn!(path = %self.path.display(), "save file signature mismatch, starting fresh");
            return None;
        }

        let saved: SaveData = match bincode::deserialize(payload) {
            Ok(saved) => saved,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "could not decode save file");
                return None;
            }
        };
        if saved.version != SAVE_VERSION {
            warn!(found = saved.version, expected = SAVE_VERSION, "save file version mismatch");
            return None;
        }
        Some(saved)
    }
}

impl Store for FileStore {
    fn load(&self) -> SaveData {
        self.read().unwrap_or_default()
    }

    fn save(&self, data: &SaveData) -> Result<(), StoreError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| StoreError::Io { path, source }
        };

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(io_err(dir))?;
        }

        let mut bytes = bincode::serialize(data)?;
        let mut mac = HmacSha256::new_from_slice(SECRET_KEY).map_err(|_| StoreError::Key)?;
        mac.update(&bytes);
        bytes.extend_from_slice(&mac.finalize().into_bytes());

        // Write to a sibling temp file, flush, then rename over the old file.
        let temp_path = self.path.with_extension("tmp");
        let written = File::create(&temp_path).and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        });
        if let Err(source) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::Io {
                path: temp_path,
                source,
            });
        }
        fs::rename(&temp_path, &self.path).map_err(io_err(&self.path))?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "saved");
        Ok(())
    }
}

/// Keeps data for the current run only, used when no data directory exists.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RefCell<SaveData>,
}

impl Store for MemoryStore {
    fn load(&self) -> SaveData {
        self.data.borrow().clone()
    }

    fn save(&self, data: &SaveData) -> Result<(), StoreError> {
        *self.data.borrow_mut() = data.clone();
        Ok(())
    }
}

/// Platform data directory, e.g. `~/.local/share/tmemory`.
pub fn data_dir() -> Option<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "tmemory", "tmemory")?;
    Some(proj_dirs.data_dir().to_path_buf())
}

/// `tmem-<8 random base36>-<millis base36>`.
pub fn generate_device_id<R: Rng + ?Sized>(rng: &mut R, millis: u64) -> String {
    let random: String = (0..8)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();
    format!("tmem-{random}-{}", to_base36(millis))
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.iter().rev().map(|&d| char::from(d)).collect()
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
