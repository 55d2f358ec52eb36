//! File-backed persistence for the channel store
//!
//! One `key=value` line per entry, written atomically by rewriting the whole
//! file. Unreadable or malformed content degrades to an empty store rather
//! than failing the command that touched it.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::Persistence;

const STATE_FILE_NAME: &str = "channels.state";

pub struct FilePersistence {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePersistence {
    /// Open (or lazily create) the state file inside `dir`
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create state directory: {:?}", dir))?;

        let path = dir.join(STATE_FILE_NAME);
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => parse_state(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read state file {:?}: {}", path, e);
                BTreeMap::new()
            }
        };

        Ok(Self { path, values })
    }

    fn write_out(&self) -> Result<()> {
        let mut contents = String::new();
        for (key, value) in &self.values {
            contents.push_str(key);
            contents.push('=');
            contents.push_str(value);
            contents.push('\n');
        }

        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write state file: {:?}", self.path))
    }
}

fn parse_state(contents: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) => {
                values.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => {
                // Not fatal, skip the line
                warn!("Ignoring malformed state line: {:?}", line);
            }
        }
    }
    values
}

impl Persistence for FilePersistence {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.write_out()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value_lines() {
        let values = parse_state("yt_id_list=a,b\n\ntw_id_list=c\n");
        assert_eq!(values.get("yt_id_list").unwrap(), "a,b");
        assert_eq!(values.get("tw_id_list").unwrap(), "c");
    }

    #[test]
    fn skips_malformed_lines() {
        let values = parse_state("garbage\nyt_id_list=a\n");
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("yt_id_list").unwrap(), "a");
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!(
            "stream-watcher-test-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        let _ = std::fs::remove_dir_all(&dir);

        {
            let mut persistence = FilePersistence::open(&dir).unwrap();
            persistence.set("yt_id_list", "one,two").unwrap();
        }

        let persistence = FilePersistence::open(&dir).unwrap();
        assert_eq!(persistence.get("yt_id_list").unwrap(), "one,two");
        assert!(persistence.get("tw_id_list").is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
