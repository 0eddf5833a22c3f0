//! Tile content format detection

use std::fmt;

use crate::core::error::Error;
use crate::core::types::Result;

/// Tile payload formats handed to a [`ContentLoader`](super::ContentLoader)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentFormat {
    /// Batched 3D model: feature table header wrapping a binary glTF
    B3dm,
    /// glTF JSON, or binary glTF identified by its `glTF` magic
    Gltf,
    /// Binary glTF identified by extension only
    Glb,
}

impl ContentFormat {
    /// Match a lowercase type key (`b3dm`, `gltf`, `glb`)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "b3dm" => Some(ContentFormat::B3dm),
            "gltf" => Some(ContentFormat::Gltf),
            "glb" => Some(ContentFormat::Glb),
            _ => None,
        }
    }

    /// Detect the format from the payload's magic bytes, falling back to the
    /// file extension. Comparison is case-insensitive.
    pub fn detect(bytes: &[u8], extension: &str) -> Result<Self> {
        let key = read_magic_bytes(bytes)
            .unwrap_or_else(|| extension.trim_start_matches('.').to_string())
            .to_ascii_lowercase();

        Self::from_key(&key).ok_or(Error::UnsupportedContent(key))
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            ContentFormat::B3dm => "b3dm",
            ContentFormat::Gltf => "gltf",
            ContentFormat::Glb => "glb",
        };
        f.write_str(key)
    }
}

/// First four bytes as text when they form an alphanumeric magic
/// (`b3dm`, `glTF`, `pnts`, ...)
pub fn read_magic_bytes(bytes: &[u8]) -> Option<String> {
    let magic = bytes.get(..4)?;
    if magic.iter().all(u8::is_ascii_alphanumeric) {
        Some(magic.iter().map(|&b| b as char).collect())
    } else {
        None
    }
}

/// Directory part of a content URI, including the trailing separator.
/// Relative resources referenced by the content resolve against it.
pub fn working_path(uri: &str) -> &str {
    let path_end = uri.find(['?', '#']).unwrap_or(uri.len());
    match uri[..path_end].rfind(['/', '\\']) {
        Some(index) => &uri[..=index],
        None => "",
    }
}
