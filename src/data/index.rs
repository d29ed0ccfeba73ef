use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

/// File name of the global LHAPDF set index.
pub const INDEX_FILENAME: &str = "pdfsets.index";

/// Numeric id → set name table, as listed in `pdfsets.index`.
///
/// Each line reads `<lhaid> <setname> [<version>]`. The id of a set is the
/// id of its central member; member `k` has id `lhaid + k`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetIndex {
    entries: BTreeMap<u32, String>,
}

impl SetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse index lines from any reader. Blank lines and `#` comments are
    /// skipped; fields may be separated by runs of spaces.
    pub fn parse<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut index = SetIndex::new();
        for (line_no, result) in csv_reader.records().enumerate() {
            let record = result.with_context(|| format!("index line {}", line_no + 1))?;
            let mut fields = record.iter().filter(|f| !f.is_empty());

            let Some(id_field) = fields.next() else {
                continue;
            };
            let lhaid: u32 = id_field
                .parse()
                .with_context(|| format!("index line {}: '{id_field}' is not an id", line_no + 1))?;
            let name = fields
                .next()
                .with_context(|| format!("index line {}: missing set name", line_no + 1))?;

            index.insert(lhaid, name);
        }
        Ok(index)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        Self::parse(file).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn insert(&mut self, lhaid: u32, name: &str) {
        self.entries.insert(lhaid, name.to_string());
    }

    /// Entries of `other` are added unless their id is already known.
    pub fn merge(&mut self, other: SetIndex) {
        for (id, name) in other.entries {
            self.entries.entry(id).or_insert(name);
        }
    }

    /// Set owning `lhaid` and the member offset inside it: the entry with the
    /// largest base id not above `lhaid`.
    pub fn lookup(&self, lhaid: u32) -> Option<(&str, usize)> {
        self.entries
            .range(..=lhaid)
            .next_back()
            .map(|(&base, name)| (name.as_str(), (lhaid - base) as usize))
    }

    /// Base id of a set name.
    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find_map(|(&id, entry)| (entry == name).then_some(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = "\
# lhaid name version
10800 CT10 1
  13000  CT14nnlo  1
331100 NNPDF40_nnlo_as_01180 1

331700 NNPDF40_nnlo_as_01180_hessian
";

    #[test]
    fn parses_ids_and_names() {
        let index = SetIndex::parse(INDEX.as_bytes()).unwrap();
        assert_eq!(index.len(), 4);
        assert_eq!(index.id_of("CT14nnlo"), Some(13000));
        assert_eq!(index.id_of("NNPDF40_nnlo_as_01180_hessian"), Some(331700));
        assert_eq!(index.id_of("MSHT20nnlo_as118"), None);
    }

    #[test]
    fn lookup_resolves_member_offsets() {
        let index = SetIndex::parse(INDEX.as_bytes()).unwrap();
        assert_eq!(index.lookup(10800), Some(("CT10", 0)));
        assert_eq!(index.lookup(13012), Some(("CT14nnlo", 12)));
        assert_eq!(index.lookup(331150), Some(("NNPDF40_nnlo_as_01180", 50)));
        assert_eq!(index.lookup(10799), None);
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let err = SetIndex::parse("CT10 10800\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("is not an id"));
    }

    #[test]
    fn merge_keeps_existing_entries() {
        let mut first = SetIndex::new();
        first.insert(100, "A");
        let mut second = SetIndex::new();
        second.insert(100, "B");
        second.insert(200, "C");

        first.merge(second);
        assert_eq!(first.lookup(100), Some(("A", 0)));
        assert_eq!(first.lookup(201), Some(("C", 1)));
    }
}
