use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;

/// Environment variables holding explicit data directories, by priority.
pub const DATA_PATH_VARS: [&str; 2] = ["LHAPDF_DATA_PATH", "LHAPATH"];

/// Ordered list of LHAPDF data directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataPath {
    dirs: Vec<PathBuf>,
}

impl DataPath {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        DataPath {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Discover data directories from the process environment.
    pub fn discover() -> Option<Self> {
        Self::from_env(|key| std::env::var(key).ok())
    }

    /// Discovery against an arbitrary environment lookup.
    ///
    /// Look-up order:
    /// - `LHAPDF_DATA_PATH`, then `LHAPATH` (list separated like `PATH`);
    /// - otherwise every prefix among `$PREFIX`, `$HOME/.local`,
    ///   `/usr/local` and `/usr` holding `share/LHAPDF` (or the nested
    ///   `share/LHAPDF/lhapdf` some distributions use).
    ///
    /// Returns `None` when nothing is found.
    pub fn from_env<F>(env: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        for var in DATA_PATH_VARS {
            if let Some(value) = env(var) {
                debug!("data path from ${var}: {value}");
                return Some(DataPath::new(std::env::split_paths(&value)));
            }
        }

        let prefixes = [
            env("PREFIX").map(PathBuf::from),
            env("HOME").map(|home| Path::new(&home).join(".local")),
            Some(PathBuf::from("/usr/local")),
            Some(PathBuf::from("/usr")),
        ];

        let dirs: Vec<PathBuf> = prefixes
            .into_iter()
            .flatten()
            .map(|prefix| prefix.join("share").join("LHAPDF"))
            .filter(|dir| dir.is_dir())
            .map(|dir| {
                let nested = dir.join("lhapdf");
                if nested.is_dir() {
                    nested
                } else {
                    dir
                }
            })
            .collect();

        if dirs.is_empty() {
            None
        } else {
            debug!("data path from prefixes: {dirs:?}");
            Some(DataPath { dirs })
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// First directory holding a folder named after the set.
    pub fn locate(&self, setname: &str) -> Option<PathBuf> {
        if setname.is_empty() || setname.contains(['/', '\\']) {
            return None;
        }
        self.dirs
            .iter()
            .map(|dir| dir.join(setname))
            .find(|candidate| candidate.is_dir())
    }

    /// Every installed set: folders containing `<name>/<name>.info`.
    /// Earlier directories shadow later ones.
    pub fn installed(&self) -> BTreeMap<String, PathBuf> {
        let mut sets = BTreeMap::new();
        for dir in &self.dirs {
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if sets.contains_key(name) {
                    continue;
                }
                if path.join(format!("{name}.info")).is_file() {
                    sets.insert(name.to_string(), path.clone());
                }
            }
        }
        sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, String)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn explicit_variables_win() {
        let joined = std::env::join_paths(["/data/a", "/data/b"]).unwrap();
        let joined = joined.to_string_lossy().into_owned();
        let env = env_of(&[
            ("LHAPATH", "/ignored".to_string()),
            ("LHAPDF_DATA_PATH", joined),
        ]);
        let path = DataPath::from_env(env).unwrap();
        assert_eq!(path.dirs(), [PathBuf::from("/data/a"), PathBuf::from("/data/b")]);
    }

    #[test]
    fn prefixes_with_nested_layout() {
        let prefix = tempfile::tempdir().unwrap();
        let nested = prefix.path().join("share/LHAPDF/lhapdf");
        std::fs::create_dir_all(&nested).unwrap();

        let env = env_of(&[("PREFIX", prefix.path().display().to_string())]);
        let path = DataPath::from_env(env).unwrap();
        assert_eq!(path.dirs()[0], nested);
    }

    #[test]
    fn installed_sets_and_shadowing() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        for (root, name) in [(&first, "A"), (&second, "A"), (&second, "B")] {
            let dir = root.path().join(name);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join(format!("{name}.info")), "SetDesc: x\n").unwrap();
        }
        std::fs::create_dir_all(second.path().join("not_a_set")).unwrap();

        let path = DataPath::new([first.path(), second.path()]);
        let installed = path.installed();
        assert_eq!(installed.keys().collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(installed["A"], first.path().join("A"));
        assert_eq!(path.locate("B"), Some(second.path().join("B")));
        assert_eq!(path.locate("../B"), None);
        assert_eq!(path.locate("missing"), None);
    }
}
