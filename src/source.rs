use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::data::index::{SetIndex, INDEX_FILENAME};
use crate::data::loader;
use crate::data::model::{RawSet, SetId};
use crate::data::path::DataPath;
use crate::error::SourceError;

// ---------------------------------------------------------------------------
// GridSource – the grid-data provider contract
// ---------------------------------------------------------------------------

/// Supplies raw grid data for PDF set identifiers.
///
/// Providers only deliver numbers; validation and interpolation always go
/// through [`PdfSet`](crate::PdfSet).
pub trait GridSource: Send + Sync {
    /// Canonical set name for an identifier, or [`SourceError::NotFound`].
    fn resolve(&self, id: &SetId) -> Result<String, SourceError>;

    /// Raw content of the set called `name`.
    fn fetch(&self, name: &str) -> Result<RawSet, SourceError>;

    /// Set name and member offset of an LHAPDF numeric member id, for
    /// providers that keep an id index. Ids beyond the last member of the
    /// owning set belong to no set.
    fn member_of(&self, _lhaid: u32) -> Option<(String, usize)> {
        None
    }
}

// ---------------------------------------------------------------------------
// LhaDirectory – sets installed in LHAPDF data directories
// ---------------------------------------------------------------------------

/// Sets stored in the LHAPDF directory layout, searched across a
/// [`DataPath`]. Numeric ids are resolved through `pdfsets.index`.
#[derive(Debug, Clone)]
pub struct LhaDirectory {
    path: DataPath,
    index: SetIndex,
}

impl LhaDirectory {
    /// Read `pdfsets.index` from every data directory that has one; a
    /// malformed index is skipped with a warning.
    pub fn new(path: DataPath) -> Self {
        let mut index = SetIndex::new();
        for dir in path.dirs() {
            let index_path = dir.join(INDEX_FILENAME);
            if !index_path.is_file() {
                continue;
            }
            match SetIndex::read(&index_path) {
                Ok(found) => {
                    debug!("{} ids from {}", found.len(), index_path.display());
                    index.merge(found);
                }
                Err(err) => warn!("skipping set index: {err:#}"),
            }
        }
        LhaDirectory { path, index }
    }

    /// Directories from `LHAPDF_DATA_PATH`, `LHAPATH` or standard prefixes.
    pub fn discover() -> Result<Self, SourceError> {
        DataPath::discover()
            .map(Self::new)
            .ok_or(SourceError::NoDataPath)
    }

    pub fn data_path(&self) -> &DataPath {
        &self.path
    }

    pub fn index(&self) -> &SetIndex {
        &self.index
    }

    /// Installed set names and their folders.
    pub fn installed(&self) -> BTreeMap<String, PathBuf> {
        self.path.installed()
    }

    /// Set and member offset of `lhaid`, checked against the member count
    /// the set declares on disk.
    fn owner(&self, lhaid: u32) -> Result<(String, usize), SourceError> {
        let not_found = || SourceError::NotFound(SetId::Lhaid(lhaid));
        let (name, member) = self.index.lookup(lhaid).ok_or_else(not_found)?;
        let dir = self.path.locate(name).ok_or_else(not_found)?;
        let count = match loader::lha_member_count(&dir, name) {
            Ok(count) => count,
            Err(SourceError::NotFound(_)) => return Err(not_found()),
            Err(err) => return Err(err),
        };
        if member < count {
            Ok((name.to_string(), member))
        } else {
            debug!("id {lhaid} is past the {count} members of '{name}'");
            Err(not_found())
        }
    }
}

impl GridSource for LhaDirectory {
    fn resolve(&self, id: &SetId) -> Result<String, SourceError> {
        match id {
            SetId::Name(name) => self
                .path
                .locate(name)
                .map(|_| name.clone())
                .ok_or_else(|| SourceError::NotFound(id.clone())),
            SetId::Lhaid(lhaid) => self.owner(*lhaid).map(|(name, _)| name),
        }
    }

    fn fetch(&self, name: &str) -> Result<RawSet, SourceError> {
        let dir = self
            .path
            .locate(name)
            .ok_or_else(|| SourceError::NotFound(SetId::Name(name.to_string())))?;
        loader::read_lha_set(&dir, name)
    }

    fn member_of(&self, lhaid: u32) -> Option<(String, usize)> {
        self.owner(lhaid).ok()
    }
}

// ---------------------------------------------------------------------------
// MemorySource – sets held in memory
// ---------------------------------------------------------------------------

/// In-memory provider, fed with [`RawSet`]s or JSON documents.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sets: BTreeMap<String, RawSet>,
    index: SetIndex,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a set under its own name, replacing any previous one.
    pub fn insert(&mut self, set: RawSet) -> &mut Self {
        self.sets.insert(set.name.clone(), set);
        self
    }

    /// Register the numeric id of a set's central member.
    pub fn register_lhaid(&mut self, lhaid: u32, name: &str) -> &mut Self {
        self.index.insert(lhaid, name);
        self
    }

    pub fn insert_json(&mut self, text: &str) -> Result<&mut Self, SourceError> {
        let set = loader::parse_json_set(text)
            .map_err(|err| SourceError::Corrupt(format!("{err:#}")))?;
        Ok(self.insert(set))
    }

    pub fn insert_json_file(&mut self, path: &Path) -> Result<&mut Self, SourceError> {
        let set = loader::read_json_set(path)?;
        Ok(self.insert(set))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }
}

impl GridSource for MemorySource {
    fn resolve(&self, id: &SetId) -> Result<String, SourceError> {
        let name = match id {
            SetId::Name(name) => self.sets.contains_key(name).then(|| name.clone()),
            SetId::Lhaid(lhaid) => self.member_of(*lhaid).map(|(name, _)| name),
        };
        name.ok_or_else(|| SourceError::NotFound(id.clone()))
    }

    fn fetch(&self, name: &str) -> Result<RawSet, SourceError> {
        self.sets
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(SetId::Name(name.to_string())))
    }

    fn member_of(&self, lhaid: u32) -> Option<(String, usize)> {
        let (name, member) = self.index.lookup(lhaid)?;
        let set = self.sets.get(name)?;
        (member < set.members.len()).then(|| (name.to_string(), member))
    }
}
