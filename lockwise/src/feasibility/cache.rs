use rustc_hash::FxHashMap;
use std::fs;
use std::io;
use std::path::Path;

/// Line-oriented store persisted between runs, keyed by source locations so
/// entries carry over on an unchanged codebase. Two entry shapes share the
/// file:
///
/// - `file:line = T|F` — per multi-state acquire call site, the branch
///   value that corresponds to an actual acquisition. Lines supplied
///   externally (by hand or by another tool) override the built-in label
///   heuristics; heuristic decisions are written back so they can be
///   inspected and corrected.
/// - `file:line -> file:line = T|F` — memoized pair feasibility verdicts;
///   the exit side of a dangling pair is written as `<exit>`.
#[derive(Debug, Default)]
pub struct FeasibilityCache {
    branches: FxHashMap<String, bool>,
    pairs: FxHashMap<String, bool>,
    dirty: bool,
}

impl FeasibilityCache {
    /// Loads a cache file; a missing file yields an empty cache.
    pub fn load(path: &Path) -> io::Result<Self> {
        let mut branches = FxHashMap::default();
        let mut pairs = FxHashMap::default();
        match fs::read_to_string(path) {
            Ok(text) => {
                for line in text.lines() {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    let Some((key, value)) = line.rsplit_once(" = ") else {
                        continue;
                    };
                    let value = match value {
                        "T" => true,
                        "F" => false,
                        _ => continue,
                    };
                    if key.contains(" -> ") {
                        pairs.insert(key.to_owned(), value);
                    } else {
                        branches.insert(key.to_owned(), value);
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        Ok(Self {
            branches,
            pairs,
            dirty: false,
        })
    }

    /// The recorded acquisition branch for a multi-state acquire site.
    #[must_use]
    pub fn branch(&self, location: &str) -> Option<bool> {
        self.branches.get(location).copied()
    }

    /// Records the acquisition branch decided for a site. Re-recording the
    /// present value leaves the cache clean.
    pub fn set_branch(&mut self, location: String, success: bool) {
        if self.branches.insert(location, success) != Some(success) {
            self.dirty = true;
        }
    }

    /// Builds the cache key for a pair between two source positions.
    #[must_use]
    pub fn key(first: &str, second: Option<&str>) -> String {
        format!("{first} -> {}", second.unwrap_or("<exit>"))
    }

    /// Cached pair verdict for a key, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<bool> {
        self.pairs.get(key).copied()
    }

    /// Records a pair verdict.
    pub fn insert(&mut self, key: String, feasible: bool) {
        if self.pairs.insert(key, feasible) != Some(feasible) {
            self.dirty = true;
        }
    }

    /// Writes the cache back when anything changed, sorted for stable
    /// diffs. Branch lines come first.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let mut text = String::new();
        for map in [&self.branches, &self.pairs] {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            for k in keys {
                text.push_str(k);
                text.push_str(if map[k] { " = T\n" } else { " = F\n" });
            }
        }
        fs::write(path, text)
    }

    /// Number of cached entries of both shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.branches.len() + self.pairs.len()
    }

    /// True when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty() && self.pairs.is_empty()
    }
}
