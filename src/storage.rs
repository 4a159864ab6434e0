// MIT License - Copyright (c) 2026 The lora-sentinel authors

//! Persisted network credentials.
//!
//! Four entries, one file each, matching what the configuration portal
//! writes. A factory reset clears all four; boot refuses to join the
//! uplink when the set is incomplete and goes straight to setup mode.

use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::error::{Result, SentinelError};

/// The four stored credential entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigEntry {
    Ssid,
    Password,
    Ip,
    Gateway,
}

impl ConfigEntry {
    pub const ALL: [ConfigEntry; 4] = [
        ConfigEntry::Ssid,
        ConfigEntry::Password,
        ConfigEntry::Ip,
        ConfigEntry::Gateway,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigEntry::Ssid => "ssid",
            ConfigEntry::Password => "password",
            ConfigEntry::Ip => "ip",
            ConfigEntry::Gateway => "gateway",
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            ConfigEntry::Ssid => "ssid.txt",
            ConfigEntry::Password => "password.txt",
            ConfigEntry::Ip => "ip.txt",
            ConfigEntry::Gateway => "gateway.txt",
        }
    }
}

/// Credential persistence.
pub trait ConfigStore: Send {
    /// Read one entry. A missing entry reads as the empty string.
    fn read(&self, entry: ConfigEntry) -> Result<String>;

    fn write(&mut self, entry: ConfigEntry, value: &str) -> Result<()>;

    /// Wipe every entry. Part of the factory-reset path.
    fn clear_all(&mut self) -> Result<()>;
}

/// File-per-entry store under a configuration directory.
pub struct FsConfigStore {
    dir: PathBuf,
}

impl FsConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| SentinelError::Storage {
            entry: dir.display().to_string(),
            source: e,
        })?;
        Ok(Self { dir })
    }

    fn path(&self, entry: ConfigEntry) -> PathBuf {
        self.dir.join(entry.file_name())
    }
}

impl ConfigStore for FsConfigStore {
    fn read(&self, entry: ConfigEntry) -> Result<String> {
        match fs::read_to_string(self.path(entry)) {
            Ok(value) => Ok(value.trim().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(SentinelError::Storage {
                entry: entry.as_str().to_string(),
                source: e,
            }),
        }
    }

    fn write(&mut self, entry: ConfigEntry, value: &str) -> Result<()> {
        fs::write(self.path(entry), value).map_err(|e| SentinelError::Storage {
            entry: entry.as_str().to_string(),
            source: e,
        })
    }

    fn clear_all(&mut self) -> Result<()> {
        for entry in ConfigEntry::ALL {
            let path = self.path(entry);
            match fs::remove_file(&path) {
                Ok(()) => info!(entry = entry.as_str(), "cleared stored credential"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(SentinelError::Storage {
                        entry: entry.as_str().to_string(),
                        source: e,
                    })
                }
            }
        }
        Ok(())
    }
}

/// The credential set, loaded at boot.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub ssid: String,
    pub password: String,
    pub ip: String,
    pub gateway: String,
}

impl Credentials {
    pub fn load(store: &dyn ConfigStore) -> Result<Self> {
        Ok(Self {
            ssid: store.read(ConfigEntry::Ssid)?,
            password: store.read(ConfigEntry::Password)?,
            ip: store.read(ConfigEntry::Ip)?,
            gateway: store.read(ConfigEntry::Gateway)?,
        })
    }

    /// Whether the set is enough to join the uplink. The password and
    /// gateway may legitimately be empty (open network, DHCP route).
    pub fn is_complete(&self) -> bool {
        !self.ssid.is_empty() && !self.ip.is_empty()
    }
}
