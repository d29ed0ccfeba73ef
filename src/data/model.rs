use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SetId – public identifier of a PDF set
// ---------------------------------------------------------------------------

/// How callers name a PDF set: by directory name or by LHAPDF numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SetId {
    Name(String),
    Lhaid(u32),
}

impl fmt::Display for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetId::Name(name) => write!(f, "{name}"),
            SetId::Lhaid(id) => write!(f, "#{id}"),
        }
    }
}

/// All-digit strings are numeric ids, anything else is a set name.
impl FromStr for SetId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.parse::<u32>() {
            Ok(id) if s.bytes().all(|b| b.is_ascii_digit()) => Ok(SetId::Lhaid(id)),
            _ => Ok(SetId::Name(s.to_string())),
        }
    }
}

impl From<&str> for SetId {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(id) => id,
            Err(never) => match never {},
        }
    }
}

impl From<String> for SetId {
    fn from(s: String) -> Self {
        SetId::from(s.as_str())
    }
}

impl From<u32> for SetId {
    fn from(id: u32) -> Self {
        SetId::Lhaid(id)
    }
}

impl From<&SetId> for SetId {
    fn from(id: &SetId) -> Self {
        id.clone()
    }
}

// ---------------------------------------------------------------------------
// MetadataValue – a single entry of a set info file or member header
// ---------------------------------------------------------------------------

/// A dynamically-typed metadata value, as found in the YAML `.info` files and
/// member headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<MetadataValue>),
    Map(BTreeMap<String, MetadataValue>),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => write!(f, "{s}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => write!(f, "{v}"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Null => write!(f, "<null>"),
            MetadataValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            MetadataValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {item}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl MetadataValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Float(v) => Some(*v),
            MetadataValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetadataValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// A list whose every element is numeric.
    pub fn as_f64_list(&self) -> Option<Vec<f64>> {
        match self {
            MetadataValue::List(items) => items.iter().map(MetadataValue::as_f64).collect(),
            _ => None,
        }
    }
}

/// Key → value table of a set info file or member header.
pub type Metadata = BTreeMap<String, MetadataValue>;

// ---------------------------------------------------------------------------
// Raw grid data – what a grid-data provider hands over
// ---------------------------------------------------------------------------

/// One Q block of a member: PDF values on `x × q` for each listed flavor.
///
/// `values` is x-major: entry `(ix * q.len() + iq) * flavors.len() + ifl`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    pub x: Vec<f64>,
    pub q: Vec<f64>,
    pub flavors: Vec<i32>,
    pub values: Vec<f64>,
}

/// A member file: header metadata plus its Q blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMember {
    #[serde(default)]
    pub header: Metadata,
    pub blocks: Vec<RawBlock>,
}

/// Unvalidated content of a whole PDF set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSet {
    pub name: String,
    #[serde(default)]
    pub info: Metadata,
    pub members: Vec<RawMember>,
}
