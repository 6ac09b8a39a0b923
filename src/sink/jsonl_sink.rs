//! Local JSONL capture of delivered map items, one item per line
//!
//! Rotates by size: `items.jsonl` → `items.jsonl.1` → ... → `items.jsonl.N`.

use super::{MapSink, SinkError};
use crate::aggregate::OutputItem;
use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub struct JsonlSink {
    state: Mutex<JsonlState>,
}

struct JsonlState {
    file: BufWriter<File>,
    current_size: u64,
    max_size: u64,
    base_path: PathBuf,
    rotation_count: u32,
    max_rotations: u32,
}

impl JsonlSink {
    pub fn new(path: impl AsRef<Path>, max_size_mb: u64, max_rotations: u32) -> Result<Self, SinkError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let current_size = file.metadata()?.len();

        Ok(Self {
            state: Mutex::new(JsonlState {
                file: BufWriter::new(file),
                current_size,
                max_size: max_size_mb * 1024 * 1024,
                base_path: path.to_path_buf(),
                rotation_count: 0,
                max_rotations,
            }),
        })
    }
}

impl JsonlState {
    fn write_batch(&mut self, items: &[OutputItem]) -> Result<(), SinkError> {
        for item in items {
            let json = serde_json::to_string(item)?;
            writeln!(self.file, "{}", json)?;
            self.current_size += (json.len() + 1) as u64;
        }
        self.file.flush()?;

        if self.max_size > 0 && self.current_size >= self.max_size {
            self.rotate()?;
        }
        Ok(())
    }

    fn rotated_path(&self, index: u32) -> PathBuf {
        let mut name = self.base_path.clone().into_os_string();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> Result<(), SinkError> {
        self.file.flush()?;

        if self.max_rotations == 0 {
            self.file = BufWriter::new(File::create(&self.base_path)?);
            self.current_size = 0;
            return Ok(());
        }

        let oldest = self.rotated_path(self.max_rotations);
        if oldest.exists() {
            std::fs::remove_file(&oldest)?;
        }
        for i in (1..self.max_rotations).rev() {
            let old_path = self.rotated_path(i);
            if old_path.exists() {
                std::fs::rename(&old_path, self.rotated_path(i + 1))?;
            }
        }
        if self.base_path.exists() {
            std::fs::rename(&self.base_path, self.rotated_path(1))?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&self.base_path)?;
        self.file = BufWriter::new(file);
        self.current_size = 0;
        self.rotation_count += 1;

        log::info!("📄 Rotated item capture file (rotation #{})", self.rotation_count);
        Ok(())
    }
}

#[async_trait]
impl MapSink for JsonlSink {
    async fn deliver(&self, items: &[OutputItem]) -> Result<(), SinkError> {
        if items.is_empty() {
            return Ok(());
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.write_batch(items)
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}
