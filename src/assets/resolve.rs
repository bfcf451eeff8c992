use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::error::{FormatizerError, FormatizerResult};

/// Host capability that turns an image URL from the design snapshot into encoded bytes.
///
/// Resolution happens at the renderer's suspension points; implementations must not block on
/// the network. URLs are expected to be resolvable locally (uploaded files, cached downloads).
pub trait ImageResolver {
    /// Return the encoded bytes behind `url`.
    fn resolve(&mut self, url: &str) -> FormatizerResult<Vec<u8>>;
}

/// Resolves relative paths under an assets root, `file://` URLs, and `data:` URLs.
#[derive(Clone, Debug)]
pub struct FsImageResolver {
    root: PathBuf,
}

impl FsImageResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageResolver for FsImageResolver {
    fn resolve(&mut self, url: &str) -> FormatizerResult<Vec<u8>> {
        let url = url.trim();
        if let Some(rest) = url.strip_prefix("data:") {
            return decode_data_url(rest);
        }
        if is_network_url(url) {
            return Err(FormatizerError::asset(format!(
                "network url '{url}' must be resolved before export"
            )));
        }

        let path = match url.strip_prefix("file://") {
            Some(abs) => PathBuf::from(abs),
            None => self.root.join(Path::new(&normalize_rel_path(url)?)),
        };
        std::fs::read(&path)
            .with_context(|| format!("read image bytes from '{}'", path.display()))
            .map_err(FormatizerError::from)
    }
}

/// In-memory url → bytes table. `data:` URLs are decoded even when not registered.
#[derive(Clone, Debug, Default)]
pub struct MemoryImageResolver {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryImageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        self.entries.insert(url.into(), bytes);
        self
    }

    pub fn with(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(url, bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ImageResolver for MemoryImageResolver {
    fn resolve(&mut self, url: &str) -> FormatizerResult<Vec<u8>> {
        if let Some(bytes) = self.entries.get(url) {
            return Ok(bytes.clone());
        }
        if let Some(rest) = url.trim().strip_prefix("data:") {
            return decode_data_url(rest);
        }
        Err(FormatizerError::asset(format!("unknown image url '{url}'")))
    }
}

fn is_network_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Decode the part of a `data:` URL after the scheme (`<mime>[;base64],<payload>`).
fn decode_data_url(rest: &str) -> FormatizerResult<Vec<u8>> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| FormatizerError::asset("data url is missing ','"))?;
    if meta.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| FormatizerError::asset(format!("invalid base64 in data url: {e}")))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Normalize and validate asset-root-relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> FormatizerResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(FormatizerError::validation(
            "image paths must be relative (use file:// for absolute paths)",
        ));
    }
    if s.is_empty() {
        return Err(FormatizerError::validation("image path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(FormatizerError::validation("image paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(FormatizerError::validation(
            "image path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolve.rs"]
mod tests;
