//! Backup and recovery for the game database.
//!
//! Archives the whole sled directory as a tar.gz with a SHA-256 checksum,
//! keeps a rolling window of the most recent archives, and can verify and
//! restore any retained archive.

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tar::{Archive, Builder};

/// How many archives to retain. Older ones are removed on rotation.
pub const DEFAULT_MAX_BACKUPS: usize = 7;

/// Per-archive metadata, persisted alongside the archives as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    /// Timestamp-based identifier, also the archive file stem.
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
    /// SHA-256 of the finished archive.
    pub checksum: String,
    pub verified: bool,
    /// Archive filename relative to the backup directory.
    pub path: PathBuf,
}

/// Creates, verifies, restores, and rotates database archives.
pub struct BackupManager {
    db_path: PathBuf,
    backup_path: PathBuf,
    max_backups: usize,
    backups: HashMap<String, BackupMetadata>,
}

impl BackupManager {
    pub fn new(db_path: PathBuf, backup_path: PathBuf, max_backups: usize) -> io::Result<Self> {
        fs::create_dir_all(&backup_path)?;
        let mut manager = Self {
            db_path,
            backup_path,
            max_backups,
            backups: HashMap::new(),
        };
        manager.load_metadata()?;
        Ok(manager)
    }

    fn metadata_file(&self) -> PathBuf {
        self.backup_path.join("backups.json")
    }

    fn load_metadata(&mut self) -> io::Result<()> {
        let path = self.metadata_file();
        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            self.backups = serde_json::from_str(&contents)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        }
        Ok(())
    }

    fn save_metadata(&self) -> io::Result<()> {
        let contents = serde_json::to_string_pretty(&self.backups)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(self.metadata_file(), contents)
    }

    /// Archive the database directory. Rotation is the caller's choice so a
    /// restore-reference archive can be kept outside the window.
    pub fn create_backup(&mut self) -> io::Result<BackupMetadata> {
        let timestamp = Utc::now();
        // Milliseconds keep ids unique across back-to-back backups.
        let id = format!("quest_backup_{}", timestamp.format("%Y%m%d_%H%M%S_%3f"));
        let filename = format!("{}.tar.gz", id);
        let backup_file = self.backup_path.join(&filename);

        log::info!("Creating backup: {}", id);

        let tar_gz = File::create(&backup_file)?;
        let enc = GzEncoder::new(tar_gz, Compression::default());
        let mut tar = Builder::new(enc);
        tar.append_dir_all("data", &self.db_path)?;

        // The archive must be fully flushed before we hash it.
        let enc = tar.into_inner()?;
        enc.finish()?;

        let checksum = calculate_checksum(&backup_file)?;
        let size_bytes = fs::metadata(&backup_file)?.len();

        let metadata = BackupMetadata {
            id: id.clone(),
            created_at: timestamp,
            size_bytes,
            checksum,
            verified: false,
            path: PathBuf::from(&filename),
        };

        self.backups.insert(id.clone(), metadata.clone());
        self.save_metadata()?;

        log::info!("Backup created: {} ({} bytes)", id, size_bytes);
        Ok(metadata)
    }

    /// Recompute the archive's checksum and compare against the recorded one.
    pub fn verify_backup(&mut self, backup_id: &str) -> io::Result<bool> {
        let metadata = self
            .backups
            .get(backup_id)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "backup not found"))?;

        let backup_file = self.backup_path.join(&metadata.path);
        if !backup_file.exists() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "backup file missing"));
        }

        let current = calculate_checksum(&backup_file)?;
        let valid = current == metadata.checksum;

        if valid {
            log::info!("Backup verification passed: {}", backup_id);
            if let Some(meta) = self.backups.get_mut(backup_id) {
                meta.verified = true;
            }
            self.save_metadata()?;
        } else {
            log::error!("Backup verification FAILED: {} (checksum mismatch)", backup_id);
        }

        Ok(valid)
    }

    /// Unpack an archive under `restore_path`. The database lands in
    /// `restore_path/data`. Verifies the checksum before touching disk.
    pub fn restore_backup(&self, backup_id: &str, restore_path: &Path) -> io::Result<()> {
        let metadata = self
            .backups
            .get(backup_id)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "backup not found"))?;

        let backup_file = self.backup_path.join(&metadata.path);
        if !backup_file.exists() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "backup file missing"));
        }

        log::info!("Restoring backup: {} to {:?}", backup_id, restore_path);

        let current = calculate_checksum(&backup_file)?;
        if current != metadata.checksum {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "backup checksum mismatch",
            ));
        }

        fs::create_dir_all(restore_path)?;
        let tar_gz = File::open(&backup_file)?;
        let dec = GzDecoder::new(tar_gz);
        let mut archive = Archive::new(dec);
        archive.unpack(restore_path)?;

        log::info!("Backup restored: {}", backup_id);
        Ok(())
    }

    /// Keep only the newest `max_backups` archives. Returns deleted ids.
    pub fn rotate(&mut self) -> io::Result<Vec<String>> {
        let mut ordered: Vec<_> = self.backups.values().cloned().collect();
        ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut deleted = Vec::new();
        for backup in ordered.iter().skip(self.max_backups) {
            if let Some(metadata) = self.backups.remove(&backup.id) {
                let backup_file = self.backup_path.join(&metadata.path);
                if backup_file.exists() {
                    fs::remove_file(&backup_file)?;
                }
                log::info!("Rotated out old backup: {}", backup.id);
                deleted.push(backup.id.clone());
            }
        }

        if !deleted.is_empty() {
            self.save_metadata()?;
        }
        Ok(deleted)
    }

    /// All known archives, newest first.
    pub fn list_backups(&self) -> Vec<BackupMetadata> {
        let mut backups: Vec<_> = self.backups.values().cloned().collect();
        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        backups
    }

    pub fn get_backup(&self, backup_id: &str) -> Option<&BackupMetadata> {
        self.backups.get(backup_id)
    }
}

fn calculate_checksum(path: &Path) -> io::Result<String> {
    use sha2::{Digest, Sha256};

    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0; 8192];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
