//! Zip packaging for multi-file outputs

use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::error::Result;

/// A finished zip archive ready to hand to the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    pub file_name: String,
    /// Entry names in the order they were written
    pub entries: Vec<String>,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// Incrementally writes entries into an in-memory zip
pub struct ArchiveBuilder {
    file_name: String,
    writer: ZipWriter<Cursor<Vec<u8>>>,
    entries: Vec<String>,
}

impl ArchiveBuilder {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, name: impl Into<String>, data: &[u8]) -> Result<()> {
        let name = name.into();
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer.start_file(name.clone(), options)?;
        self.writer.write_all(data)?;
        self.entries.push(name);
        Ok(())
    }

    pub fn finish(self) -> Result<Archive> {
        let data = self.writer.finish()?.into_inner();
        tracing::debug!(
            "Packed {} entries into {} ({} bytes)",
            self.entries.len(),
            self.file_name,
            data.len()
        );
        Ok(Archive {
            file_name: self.file_name,
            entries: self.entries,
            data,
        })
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
pub(crate) fn read_entries(data: &[u8]) -> Vec<(String, Vec<u8>)> {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut contents = Vec::new();
            file.read_to_end(&mut contents).unwrap();
            (file.name().to_string(), contents)
        })
        .collect()
}
