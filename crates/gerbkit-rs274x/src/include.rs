//! Include file resolution (`%IF...*%`)
//!
//! The interpreter does not touch the filesystem directly. An
//! [`IncludeResolver`] turns the name written in the file into a
//! readable stream, so the same parser works on disk files and on
//! in-memory layers.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

/// Opens the stream named by an include command.
///
/// Names are resolved against one fixed base, never against the file
/// that contains the `%IF` command. A relative name inside a nested
/// include is looked up in the same place as a top-level one.
pub trait IncludeResolver {
    /// Open `name` for reading.
    ///
    /// Lookup is case-insensitive where the backing store allows it.
    fn open(&self, name: &str) -> io::Result<Box<dyn BufRead>>;
}

/// Resolves include names against the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FsIncludeResolver {
    base_dir: Option<PathBuf>,
}

impl FsIncludeResolver {
    /// Relative names are resolved against `base_dir`
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Find a directory entry whose name matches ignoring ASCII case
    fn find_case_insensitive(path: &Path) -> Option<PathBuf> {
        let wanted = path.file_name()?.to_str()?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::read_dir(dir)
            .ok()?
            .filter_map(|entry| entry.ok())
            .find(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|n| n.eq_ignore_ascii_case(wanted))
            })
            .map(|entry| entry.path())
    }
}

impl IncludeResolver for FsIncludeResolver {
    fn open(&self, name: &str) -> io::Result<Box<dyn BufRead>> {
        let path = self.resolve(name);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let alt = Self::find_case_insensitive(&path).ok_or(e)?;
                File::open(alt)?
            }
            Err(e) => return Err(e),
        };
        Ok(Box::new(BufReader::new(file)))
    }
}

/// In-memory include files, keyed by name
#[derive(Debug, Clone, Default)]
pub struct MemoryIncludeResolver {
    files: HashMap<String, String>,
}

impl MemoryIncludeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.files.insert(name.into(), content.into());
    }

    pub fn with_file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.add(name, content);
        self
    }
}

impl IncludeResolver for MemoryIncludeResolver {
    fn open(&self, name: &str) -> io::Result<Box<dyn BufRead>> {
        let content = self
            .files
            .get(name)
            .or_else(|| {
                self.files
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_string()))?;
        Ok(Box::new(Cursor::new(content.clone().into_bytes())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_memory_resolver_ignores_case() {
        let resolver = MemoryIncludeResolver::new().with_file("Pads.GBR", "%MOMM*%\n");
        let mut text = String::new();
        resolver
            .open("pads.gbr")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "%MOMM*%\n");
        assert!(resolver.open("missing.gbr").is_err());
    }
}
