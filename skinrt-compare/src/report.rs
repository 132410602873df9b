//! Discrepancy report

use std::fmt;

use serde::Serialize;
use skinrt_core::{Error, Result};

/// Which of the two compared trees something belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Old,
    New,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Old => f.write_str("old"),
            Side::New => f.write_str("new"),
        }
    }
}

/// A bind-data component that differs beyond tolerance, with both values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ValueMismatch {
    /// Rotation rows, old and new
    Rotation {
        old: [[f32; 3]; 3],
        new: [[f32; 3]; 3],
    },
    Translation {
        old: [f32; 3],
        new: [f32; 3],
    },
    Scale {
        old: f32,
        new: f32,
    },
}

impl ValueMismatch {
    pub fn component(&self) -> &'static str {
        match self {
            ValueMismatch::Rotation { .. } => "rotation",
            ValueMismatch::Translation { .. } => "translation",
            ValueMismatch::Scale { .. } => "scale",
        }
    }
}

impl fmt::Display for ValueMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueMismatch::Rotation { old, new } => {
                write!(f, "rotation mismatch {:?} != {:?}", old, new)
            }
            ValueMismatch::Translation { old, new } => {
                write!(f, "translation mismatch {:?} != {:?}", old, new)
            }
            ValueMismatch::Scale { old, new } => write!(f, "scale mismatch {} != {}", old, new),
        }
    }
}

/// Bind data of a bone present in both trees drifted beyond tolerance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericMismatch {
    pub geometry: String,
    pub bone: String,
    pub value: ValueMismatch,
}

/// Shape differences between the two skin bindings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StructuralKind {
    /// The bone only exists in the new tree
    MissingInOld { bone: String },
    /// The bone was dropped from the new tree
    MissingInNew { bone: String },
    /// Bone and bind-data sequences differ in length
    MisalignedBindData { side: Side, bones: usize, bind_data: usize },
    /// The bone name occurs more than once in one skin
    DuplicateBone { side: Side, bone: String },
    /// A skinned old geometry has no partner in the new tree
    GeometryMissingInNew,
    /// The geometry is skinned on one side only
    SkinMissing { side: Side },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuralMismatch {
    pub geometry: String,
    pub kind: StructuralKind,
}

/// One entry of a [`DiscrepancyReport`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Discrepancy {
    Numeric(NumericMismatch),
    Structural(StructuralMismatch),
}

impl Discrepancy {
    pub fn geometry(&self) -> &str {
        match self {
            Discrepancy::Numeric(m) => &m.geometry,
            Discrepancy::Structural(m) => &m.geometry,
        }
    }

    /// Name of the bone this entry is about, if any
    pub fn bone(&self) -> Option<&str> {
        match self {
            Discrepancy::Numeric(m) => Some(&m.bone),
            Discrepancy::Structural(m) => match &m.kind {
                StructuralKind::MissingInOld { bone }
                | StructuralKind::MissingInNew { bone }
                | StructuralKind::DuplicateBone { bone, .. } => Some(bone),
                _ => None,
            },
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, Discrepancy::Structural(_))
    }
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::Numeric(m) => {
                write!(f, "[{}] bone '{}': {}", m.geometry, m.bone, m.value)
            }
            Discrepancy::Structural(m) => match &m.kind {
                StructuralKind::MissingInOld { bone } => {
                    write!(f, "[{}] bone '{}' missing in old tree", m.geometry, bone)
                }
                StructuralKind::MissingInNew { bone } => {
                    write!(f, "[{}] bone '{}' missing in new tree", m.geometry, bone)
                }
                StructuralKind::MisalignedBindData { side, bones, bind_data } => write!(
                    f,
                    "[{}] {} skin has {} bones but {} bind transforms",
                    m.geometry, side, bones, bind_data
                ),
                StructuralKind::DuplicateBone { side, bone } => {
                    write!(f, "[{}] bone '{}' listed twice in {} skin", m.geometry, bone, side)
                }
                StructuralKind::GeometryMissingInNew => {
                    write!(f, "[{}] skinned geometry missing in new tree", m.geometry)
                }
                StructuralKind::SkinMissing { side } => {
                    write!(f, "[{}] geometry has no skin in {} tree", m.geometry, side)
                }
            },
        }
    }
}

/// Result of comparing two skin setups. Empty means full agreement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiscrepancyReport {
    entries: Vec<Discrepancy>,
    /// Number of geometry pairs that were examined
    pub geometry_pairs: usize,
    /// Number of bones compared numerically
    pub bones_compared: usize,
}

impl DiscrepancyReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: Discrepancy) {
        self.entries.push(entry);
    }

    pub fn push_structural<S: Into<String>>(&mut self, geometry: S, kind: StructuralKind) {
        self.push(Discrepancy::Structural(StructuralMismatch {
            geometry: geometry.into(),
            kind,
        }));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[Discrepancy] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Discrepancy> {
        self.entries.iter()
    }

    pub fn numeric(&self) -> impl Iterator<Item = &NumericMismatch> {
        self.entries.iter().filter_map(|e| match e {
            Discrepancy::Numeric(m) => Some(m),
            _ => None,
        })
    }

    pub fn structural(&self) -> impl Iterator<Item = &StructuralMismatch> {
        self.entries.iter().filter_map(|e| match e {
            Discrepancy::Structural(m) => Some(m),
            _ => None,
        })
    }

    /// Entries mentioning the given bone
    pub fn for_bone<'a>(&'a self, bone: &'a str) -> impl Iterator<Item = &'a Discrepancy> {
        self.entries.iter().filter(move |e| e.bone() == Some(bone))
    }

    /// Strict mode: any entry turns the report into an error
    pub fn into_result(self) -> Result<Self> {
        if self.is_empty() {
            Ok(self)
        } else {
            Err(Error::Discrepancies { count: self.len() })
        }
    }
}

impl fmt::Display for DiscrepancyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} discrepancies ({} geometry pairs, {} bones compared)",
            self.entries.len(),
            self.geometry_pairs,
            self.bones_compared
        )?;
        for entry in &self.entries {
            writeln!(f, "  {}", entry)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DiscrepancyReport {
    type Item = &'a Discrepancy;
    type IntoIter = std::slice::Iter<'a, Discrepancy>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
