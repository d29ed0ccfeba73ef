use std::collections::BTreeMap;

use log::warn;

use crate::data::model::{Metadata, MetadataValue, RawBlock, RawMember, RawSet};
use crate::error::{GridError, PdfError, Result};
use crate::grid::{Axis, Grid, Interpolation, Scale, Subgrids};

/// PDG id of the gluon; flavor 0 is accepted as an alias.
pub const GLUON: i32 = 21;

// ---------------------------------------------------------------------------
// MemberKind
// ---------------------------------------------------------------------------

/// Role of a member inside its set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Central,
    /// Hessian eigenvector direction.
    Error,
    /// Monte Carlo replica.
    Replica,
    Other,
}

impl MemberKind {
    /// Decide the kind of member `index` from its header `PdfType` and the
    /// set's `ErrorType`. Member 0 is always the central one.
    pub fn resolve(
        index: usize,
        pdf_type: Option<&str>,
        error_type: Option<&str>,
    ) -> std::result::Result<Self, String> {
        if let Some(pdf_type) = pdf_type {
            let kind = match pdf_type.to_ascii_lowercase().as_str() {
                "central" => MemberKind::Central,
                "error" => MemberKind::Error,
                "replica" => MemberKind::Replica,
                _ => MemberKind::Other,
            };
            if index == 0 && kind != MemberKind::Central {
                return Err(format!("member 0000 has to be 'central', found '{pdf_type}'"));
            }
            return Ok(kind);
        }

        if index == 0 {
            return Ok(MemberKind::Central);
        }
        let error_type = error_type.map(str::to_ascii_lowercase).unwrap_or_default();
        Ok(match error_type.as_str() {
            "hessian" | "symmhessian" | "symhessian" => MemberKind::Error,
            "replicas" => MemberKind::Replica,
            _ => MemberKind::Other,
        })
    }
}

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

/// One member of a set: a stack of `(x, Q)` grids per flavor.
#[derive(Debug, Clone)]
pub struct Member {
    kind: MemberKind,
    header: Metadata,
    flavors: BTreeMap<i32, Subgrids>,
}

impl Member {
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn header(&self) -> &Metadata {
        &self.header
    }

    pub fn flavors(&self) -> impl Iterator<Item = i32> + '_ {
        self.flavors.keys().copied()
    }

    /// Grids of `flavor`, treating 0 and 21 as the same gluon id.
    pub fn grids(&self, flavor: i32) -> Option<&Subgrids> {
        self.flavors.get(&flavor).or_else(|| match flavor {
            0 => self.flavors.get(&GLUON),
            GLUON => self.flavors.get(&0),
            _ => None,
        })
    }

    fn from_raw(
        raw: RawMember,
        kind: MemberKind,
        scale: Scale,
    ) -> std::result::Result<Self, String> {
        let mut stacks: BTreeMap<i32, Vec<Grid>> = BTreeMap::new();
        let mut expected_flavors: Option<Vec<i32>> = None;

        for (b, block) in raw.blocks.into_iter().enumerate() {
            let mut sorted = block.flavors.clone();
            sorted.sort_unstable();
            if sorted.windows(2).any(|w| w[0] == w[1]) {
                return Err(format!("block {b} lists a flavor twice"));
            }
            match &expected_flavors {
                Some(expected) => {
                    if *expected != sorted {
                        return Err(format!(
                            "block {b} flavors {:?} differ from {expected:?}",
                            block.flavors
                        ));
                    }
                }
                None => expected_flavors = Some(sorted),
            }

            let grids = split_block(block, scale).map_err(|e| format!("block {b}: {e}"))?;
            for (flavor, grid) in grids {
                stacks.entry(flavor).or_default().push(grid);
            }
        }

        let flavors = stacks
            .into_iter()
            .map(|(flavor, blocks)| {
                Subgrids::new(blocks)
                    .map(|stack| (flavor, stack))
                    .map_err(|e| format!("flavor {flavor}: {e}"))
            })
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;
        if flavors.is_empty() {
            return Err("member has no grid blocks".to_string());
        }

        Ok(Member {
            kind,
            header: raw.header,
            flavors,
        })
    }
}

/// Split an x-major multi-flavor block into one 2-D grid per flavor.
fn split_block(block: RawBlock, scale: Scale) -> std::result::Result<Vec<(i32, Grid)>, GridError> {
    let nfl = block.flavors.len();
    let x = Axis::new(block.x, scale)?;
    let q = Axis::new(block.q, scale)?;
    let expected = x.len() * q.len() * nfl;
    if block.values.len() != expected {
        return Err(GridError::ShapeMismatch {
            shape: vec![x.len(), q.len(), nfl],
            expected,
            actual: block.values.len(),
        });
    }

    block
        .flavors
        .iter()
        .enumerate()
        .map(|(f, &flavor)| {
            let values = block.values.iter().skip(f).step_by(nfl).copied().collect();
            Grid::new(vec![x.clone(), q.clone()], values).map(|grid| (flavor, grid))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// PdfSet
// ---------------------------------------------------------------------------

/// A loaded, validated and immutable PDF set.
#[derive(Debug, Clone)]
pub struct PdfSet {
    name: String,
    info: Metadata,
    interpolation: Interpolation,
    members: Vec<Member>,
    alphas: Option<Subgrids>,
}

impl PdfSet {
    /// Validate raw provider data.
    ///
    /// Fails with [`PdfError::CorruptData`] on any monotonicity or shape
    /// violation, inconsistent member metadata, or unsupported scheme.
    pub fn from_raw(raw: RawSet) -> Result<Self> {
        let name = raw.name;
        let corrupt = |reason: String| PdfError::CorruptData {
            set: name.clone(),
            reason,
        };
        let info = raw.info;

        let interpolator = info_str(&info, "Interpolator").unwrap_or("logcubic");
        let (interpolation, scale) = scheme(interpolator)
            .ok_or_else(|| corrupt(format!("unsupported interpolator '{interpolator}'")))?;
        if let Some(extrapolator) = info_str(&info, "Extrapolator") {
            if !matches!(extrapolator.to_ascii_lowercase().as_str(), "error" | "nan") {
                warn!(
                    "set '{name}': ignoring extrapolator '{extrapolator}', \
                     off-grid points evaluate to NaN"
                );
            }
        }

        if raw.members.is_empty() {
            return Err(corrupt("set has no members".to_string()));
        }
        if let Some(declared) = info.get("NumMembers").and_then(MetadataValue::as_i64) {
            if declared != raw.members.len() as i64 {
                return Err(corrupt(format!(
                    "info declares {declared} members, found {}",
                    raw.members.len()
                )));
            }
        }

        let error_type = info_str(&info, "ErrorType");
        let members = raw
            .members
            .into_iter()
            .enumerate()
            .map(|(i, member)| {
                let pdf_type = member.header.get("PdfType").and_then(MetadataValue::as_str);
                let kind = MemberKind::resolve(i, pdf_type, error_type).map_err(&corrupt)?;
                Member::from_raw(member, kind, scale)
                    .map_err(|e| corrupt(format!("member {i:04}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let alphas = alphas_table(&info).map_err(&corrupt)?;

        Ok(PdfSet {
            name,
            info,
            interpolation,
            members,
            alphas,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self) -> &Metadata {
        &self.info
    }

    pub fn description(&self) -> Option<&str> {
        info_str(&self.info, "SetDesc")
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Indices of members of a given kind, e.g. all replicas.
    pub fn members_of(&self, kind: MemberKind) -> Vec<usize> {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, m)| m.kind == kind)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn member(&self, member: usize) -> Result<&Member> {
        self.members.get(member).ok_or_else(|| PdfError::MemberOutOfRange {
            set: self.name.clone(),
            member,
            available: self.members.len(),
        })
    }

    /// Evaluate a batch of points for one flavor of one member.
    ///
    /// Output `i` belongs to `points[i]`; off-grid points give NaN without
    /// affecting their neighbours. Errors only concern the selectors and the
    /// number of coordinates per point, and are raised before evaluating.
    pub fn evaluate<P: AsRef<[f64]>>(
        &self,
        flavor: i32,
        member: usize,
        points: &[P],
    ) -> Result<Vec<f64>> {
        let grids = self.grids(flavor, member)?;
        let ndim = grids.ndim();
        for (index, point) in points.iter().enumerate() {
            let actual = point.as_ref().len();
            if actual != ndim {
                return Err(PdfError::DimensionMismatch {
                    index,
                    expected: ndim,
                    actual,
                });
            }
        }

        Ok(points
            .iter()
            .map(|p| grids.interpolate(p.as_ref(), self.interpolation))
            .collect())
    }

    pub fn evaluate_point(&self, flavor: i32, member: usize, point: &[f64]) -> Result<f64> {
        self.evaluate(flavor, member, &[point]).map(|values| values[0])
    }

    /// Strong coupling at scale `q` from the set's `AlphaS_Qs`/`AlphaS_Vals`
    /// table. NaN off-grid or when the set ships no table.
    pub fn alphas(&self, q: f64) -> f64 {
        self.alphas
            .as_ref()
            .map_or(crate::UNDEFINED, |table| table.interpolate(&[q], self.interpolation))
    }

    fn grids(&self, flavor: i32, member: usize) -> Result<&Subgrids> {
        self.member(member)?
            .grids(flavor)
            .ok_or_else(|| PdfError::UnknownFlavor {
                set: self.name.clone(),
                flavor,
            })
    }
}

// -- info helpers --

fn info_str<'a>(info: &'a Metadata, key: &str) -> Option<&'a str> {
    info.get(key).and_then(MetadataValue::as_str)
}

/// Local scheme and axis scale named by the `Interpolator` info entry.
fn scheme(name: &str) -> Option<(Interpolation, Scale)> {
    match name.to_ascii_lowercase().as_str() {
        "logcubic" => Some((Interpolation::Cubic, Scale::Log)),
        "cubic" => Some((Interpolation::Cubic, Scale::Linear)),
        "loglinear" => Some((Interpolation::Linear, Scale::Log)),
        "linear" => Some((Interpolation::Linear, Scale::Linear)),
        _ => None,
    }
}

/// αs(Q) table, split into subgrids where a Q value repeats (flavor
/// thresholds).
fn alphas_table(info: &Metadata) -> std::result::Result<Option<Subgrids>, String> {
    let (Some(qs), Some(vals)) = (info.get("AlphaS_Qs"), info.get("AlphaS_Vals")) else {
        return Ok(None);
    };
    let qs = qs.as_f64_list().ok_or("AlphaS_Qs is not a list of numbers")?;
    let vals = vals.as_f64_list().ok_or("AlphaS_Vals is not a list of numbers")?;
    if qs.len() != vals.len() {
        return Err(format!(
            "AlphaS_Qs has {} entries, AlphaS_Vals has {}",
            qs.len(),
            vals.len()
        ));
    }

    let mut blocks = Vec::new();
    let mut start = 0;
    for end in 1..=qs.len() {
        if end == qs.len() || qs[end] == qs[end - 1] {
            let axis = Axis::log(qs[start..end].to_vec())
                .map_err(|e| format!("AlphaS_Qs: {e}"))?;
            let grid = Grid::new(vec![axis], vals[start..end].to_vec())
                .map_err(|e| format!("AlphaS_Vals: {e}"))?;
            blocks.push(grid);
            start = end;
        }
    }
    Subgrids::new(blocks)
        .map(Some)
        .map_err(|e| format!("AlphaS_Qs: {e}"))
}
