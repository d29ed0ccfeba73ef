use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::{debug, warn};

use super::model::{Metadata, RawBlock, RawMember, RawSet, SetId};
use crate::error::SourceError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read a whole set stored in LHAPDF layout:
///
/// ```text
/// <dir>/<name>.info        YAML set metadata
/// <dir>/<name>_0000.dat    central member
/// <dir>/<name>_0001.dat    ...
/// ```
///
/// Member numbers must run contiguously from `0000`.
pub fn read_lha_set(dir: &Path, name: &str) -> Result<RawSet, SourceError> {
    let info = read_lha_info(dir, name)?;
    let member_files = member_files(dir, name)?;

    let mut members = Vec::with_capacity(member_files.len());
    for (expected, (number, path)) in member_files.into_iter().enumerate() {
        if number != expected {
            return Err(SourceError::Corrupt(format!(
                "set '{name}' is missing member {expected:04}"
            )));
        }
        let text = read_text(&path)?;
        let member = parse_member(&text)
            .with_context(|| format!("{}", path.display()))
            .map_err(corrupt)?;
        members.push(member);
    }
    debug!("read {} members of '{name}' from {}", members.len(), dir.display());

    Ok(RawSet {
        name: name.to_string(),
        info,
        members,
    })
}

/// Number of members of the LHA set in `dir`, without reading any grid:
/// `NumMembers` from the info file, or the count of member files when the
/// info does not declare it.
pub fn lha_member_count(dir: &Path, name: &str) -> Result<usize, SourceError> {
    let info = read_lha_info(dir, name)?;
    match info.get("NumMembers") {
        Some(value) => value
            .as_i64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| SourceError::Corrupt(format!("set '{name}': NumMembers is {value}"))),
        None => Ok(member_files(dir, name)?.len()),
    }
}

fn read_lha_info(dir: &Path, name: &str) -> Result<Metadata, SourceError> {
    let info_path = dir.join(format!("{name}.info"));
    if !info_path.is_file() {
        return Err(SourceError::NotFound(SetId::Name(name.to_string())));
    }
    let info_text = read_text(&info_path)?;
    parse_info(&info_text)
        .with_context(|| format!("{}", info_path.display()))
        .map_err(corrupt)
}

/// `<name>_NNNN.dat` files of `dir`, sorted by member number.
fn member_files(dir: &Path, name: &str) -> Result<Vec<(usize, PathBuf)>, SourceError> {
    let entries = std::fs::read_dir(dir).map_err(|source| SourceError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files: Vec<(usize, PathBuf)> = entries
        .flatten()
        .filter_map(|entry| {
            let number = entry.file_name().to_str().and_then(|f| member_number(name, f))?;
            Some((number, entry.path()))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Read a set stored as a single JSON document (the serialized [`RawSet`]).
pub fn read_json_set(path: &Path) -> Result<RawSet, SourceError> {
    let text = read_text(path)?;
    parse_json_set(&text)
        .with_context(|| format!("{}", path.display()))
        .map_err(corrupt)
}

/// Expected JSON schema:
///
/// ```json
/// {
///   "name": "toy",
///   "info": { "SetDesc": "...", "Interpolator": "logcubic" },
///   "members": [
///     { "header": { "PdfType": "central" },
///       "blocks": [ { "x": [...], "q": [...], "flavors": [...], "values": [...] } ] }
///   ]
/// }
/// ```
pub fn parse_json_set(text: &str) -> Result<RawSet> {
    let set: RawSet = serde_json::from_str(text).context("parsing JSON set")?;
    if set.name.is_empty() {
        bail!("JSON set has an empty name");
    }
    Ok(set)
}

// ---------------------------------------------------------------------------
// LHA text parsers
// ---------------------------------------------------------------------------

/// Parse the YAML `.info` file of a set.
pub fn parse_info(text: &str) -> Result<Metadata> {
    if text.trim().is_empty() {
        return Ok(Metadata::new());
    }
    serde_yaml::from_str(text).context("parsing set info")
}

/// Member number encoded in `<setname>_NNNN.dat`, if `file_name` follows the
/// convention.
pub fn member_number(setname: &str, file_name: &str) -> Option<usize> {
    let digits = file_name
        .strip_prefix(setname)?
        .strip_prefix('_')?
        .strip_suffix(".dat")?;
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Parse a member file: YAML header, then blocks, each closed by a `---` line.
pub fn parse_member(text: &str) -> Result<RawMember> {
    let mut parts = split_sections(text);
    if parts.len() < 2 {
        bail!("member has no '---' separator after its header");
    }

    let header_text = parts.remove(0);
    let header: Metadata = if header_text.trim().is_empty() {
        Metadata::new()
    } else {
        serde_yaml::from_str(&header_text).context("parsing member header")?
    };

    match parts.last() {
        Some(last) if last.trim().is_empty() => {
            parts.pop();
        }
        _ => warn!("member does not end with '---'; treating the trailing text as a block"),
    }

    let blocks = parts
        .iter()
        .enumerate()
        .map(|(i, block)| parse_block(block).with_context(|| format!("block {i}")))
        .collect::<Result<Vec<_>>>()?;
    if blocks.is_empty() {
        bail!("member has no grid blocks");
    }

    Ok(RawMember { header, blocks })
}

/// Parse one block:
///
/// ```text
/// x_0 x_1 ... x_nx
/// q_0 q_1 ... q_nq
/// fl_0 fl_1 ... fl_nf
/// v(x_0, q_0, fl_0) ... v(x_0, q_0, fl_nf)
/// v(x_0, q_1, fl_0) ...
/// ```
pub fn parse_block(text: &str) -> Result<RawBlock> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let x = parse_floats(lines.next().context("missing x line")?, "x")?;
    let q = parse_floats(lines.next().context("missing Q line")?, "Q")?;
    let flavors = lines
        .next()
        .context("missing flavor line")?
        .split_whitespace()
        .map(|tok| {
            tok.parse::<i32>()
                .with_context(|| format!("flavor '{tok}' is not an integer"))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut values = Vec::with_capacity(x.len() * q.len() * flavors.len());
    let mut rows = 0;
    for (row, line) in lines.enumerate() {
        let before = values.len();
        for (j, tok) in line.split_whitespace().enumerate() {
            values.push(
                tok.parse::<f64>()
                    .with_context(|| format!("row {row}, column {j}: '{tok}' is not a number"))?,
            );
        }
        let width = values.len() - before;
        if width != flavors.len() {
            bail!("row {row} has {width} values for {} flavors", flavors.len());
        }
        rows += 1;
    }
    if rows != x.len() * q.len() {
        bail!(
            "block has {rows} rows, expected {} x {} = {}",
            x.len(),
            q.len(),
            x.len() * q.len()
        );
    }

    Ok(RawBlock {
        x,
        q,
        flavors,
        values,
    })
}

// -- helpers --

/// Split on lines consisting of `---`.
fn split_sections(text: &str) -> Vec<String> {
    let mut sections = vec![String::new()];
    for line in text.lines() {
        if line.trim() == "---" {
            sections.push(String::new());
        } else if let Some(current) = sections.last_mut() {
            current.push_str(line);
            current.push('\n');
        }
    }
    sections
}

fn parse_floats(line: &str, what: &str) -> Result<Vec<f64>> {
    line.split_whitespace()
        .enumerate()
        .map(|(j, tok)| {
            tok.parse::<f64>()
                .with_context(|| format!("{what}[{j}]: '{tok}' is not a number"))
        })
        .collect()
}

fn read_text(path: &Path) -> Result<String, SourceError> {
    std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn corrupt(err: anyhow::Error) -> SourceError {
    SourceError::Corrupt(format!("{err:#}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMBER: &str = "\
PdfType: central
Format: lhagrid1
---
1e-3 1e-1 1.0
1.0 10.0
-1 21
 0.1 0.2
 0.3 0.4
 0.5 0.6
 0.7 0.8
 0.9 1.0
 1.1 1.2
---
1e-3 1.0
10.0 100.0
-1 21
 1 2
 3 4
 5 6
 7 8
---
";

    #[test]
    fn parses_header_and_blocks() {
        let member = parse_member(MEMBER).unwrap();
        assert_eq!(member.header["PdfType"].as_str(), Some("central"));
        assert_eq!(member.blocks.len(), 2);

        let first = &member.blocks[0];
        assert_eq!(first.x, vec![1e-3, 1e-1, 1.0]);
        assert_eq!(first.q, vec![1.0, 10.0]);
        assert_eq!(first.flavors, vec![-1, 21]);
        assert_eq!(first.values.len(), 12);
        assert_eq!(first.values[3], 0.4);
        assert_eq!(member.blocks[1].values[7], 8.0);
    }

    #[test]
    fn tolerates_missing_final_separator() {
        let text = MEMBER.trim_end().trim_end_matches("---");
        let member = parse_member(text).unwrap();
        assert_eq!(member.blocks.len(), 2);
    }

    #[test]
    fn reports_row_count_mismatch() {
        let text = "PdfType: central\n---\n0.1 1.0\n1.0 2.0\n21\n1\n2\n3\n---\n";
        let err = parse_member(text).unwrap_err();
        assert!(format!("{err:#}").contains("block has 3 rows, expected 2 x 2 = 4"));
    }

    #[test]
    fn reports_bad_numbers_with_position() {
        let text = "---\n0.1 oops\n1.0 2.0\n21\n1\n2\n3\n4\n---\n";
        let err = parse_member(text).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("block 0"), "{message}");
        assert!(message.contains("x[1]: 'oops' is not a number"), "{message}");
    }

    #[test]
    fn member_file_names() {
        assert_eq!(member_number("CT18NNLO", "CT18NNLO_0000.dat"), Some(0));
        assert_eq!(member_number("CT18NNLO", "CT18NNLO_0058.dat"), Some(58));
        assert_eq!(member_number("CT18NNLO", "CT18NNLO_58.dat"), None);
        assert_eq!(member_number("CT18NNLO", "CT18NNLO.info"), None);
        assert_eq!(member_number("CT18", "CT18NNLO_0000.dat"), None);
    }

    #[test]
    fn json_documents() {
        let text = r#"{
            "name": "toy",
            "info": {"Interpolator": "linear"},
            "members": [{"blocks": [{"x": [0.1, 1.0], "q": [1.0, 2.0], "flavors": [21],
                                     "values": [1.0, 2.0, 3.0, 4.0]}]}]
        }"#;
        let set = parse_json_set(text).unwrap();
        assert_eq!(set.name, "toy");
        assert_eq!(set.info["Interpolator"].as_str(), Some("linear"));
        assert!(set.members[0].header.is_empty());
        assert!(parse_json_set(r#"{"name": "", "members": []}"#).is_err());
    }

    #[test]
    fn member_count_from_info_or_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path();
        assert!(matches!(lha_member_count(path, "toy"), Err(SourceError::NotFound(_))));

        std::fs::write(path.join("toy.info"), "SetDesc: toy\n").unwrap();
        for number in 0..3 {
            std::fs::write(path.join(format!("toy_{number:04}.dat")), MEMBER).unwrap();
        }
        std::fs::write(path.join("toy_extra.dat"), "").unwrap();
        assert_eq!(lha_member_count(path, "toy").unwrap(), 3);

        std::fs::write(path.join("toy.info"), "NumMembers: 101\n").unwrap();
        assert_eq!(lha_member_count(path, "toy").unwrap(), 101);

        std::fs::write(path.join("toy.info"), "NumMembers: many\n").unwrap();
        assert!(matches!(lha_member_count(path, "toy"), Err(SourceError::Corrupt(_))));
    }
}
