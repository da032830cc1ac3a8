//! Attribute catalog - which table and column index a DICOM attribute.
//!
//! The set of searchable attributes is closed: [`Attribute`] enumerates it
//! and [`resolve`] is a total match over it, so an attribute without a
//! mapping cannot exist at runtime. Adding an attribute means adding a
//! variant here, and the compiler then points at every place that has to
//! learn about it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema::{series_metadata_core, study_metadata_core, uid_mapping, Column, Table};

/// Table that owns an indexed attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Identifier mapping table (`m`).
    Mapping,
    /// Study metadata table (`st`).
    Study,
    /// Series metadata table (`se`).
    Series,
}

impl TableKind {
    /// Alias the generated statements give this table.
    pub fn alias(&self) -> &'static str {
        match self {
            TableKind::Mapping => "m",
            TableKind::Study => "st",
            TableKind::Series => "se",
        }
    }

    /// The physical table.
    pub fn table(&self) -> &'static Table {
        match self {
            TableKind::Mapping => &uid_mapping::TABLE,
            TableKind::Study => &study_metadata_core::TABLE,
            TableKind::Series => &series_metadata_core::TABLE,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table().name)
    }
}

/// A DICOM data element tag: (group, element).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    pub group: u16,
    pub element: u16,
}

impl Tag {
    pub const fn new(group: u16, element: u16) -> Self {
        Self { group, element }
    }

    /// Parse the 8 hex digit form used in QIDO-RS query keys, e.g. `0020000D`.
    pub fn parse_hex(s: &str) -> Option<Self> {
        if s.len() != 8 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let group = u16::from_str_radix(&s[..4], 16).ok()?;
        let element = u16::from_str_radix(&s[4..], 16).ok()?;
        Some(Self { group, element })
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.group, self.element)
    }
}

/// A searchable DICOM attribute.
///
/// Serialized by DICOM keyword; the 8 hex digit tag is accepted as an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    #[serde(rename = "StudyInstanceUID", alias = "0020000D")]
    StudyInstanceUid,
    #[serde(rename = "SeriesInstanceUID", alias = "0020000E")]
    SeriesInstanceUid,
    #[serde(rename = "SOPInstanceUID", alias = "00080018")]
    SopInstanceUid,
    #[serde(rename = "PatientID", alias = "00100020")]
    PatientId,
    #[serde(alias = "00100010")]
    PatientName,
    #[serde(alias = "00080090")]
    ReferringPhysicianName,
    #[serde(alias = "00080020")]
    StudyDate,
    #[serde(alias = "00081030")]
    StudyDescription,
    #[serde(alias = "00080050")]
    AccessionNumber,
    #[serde(alias = "00080060")]
    Modality,
    #[serde(alias = "00400244")]
    PerformedProcedureStepStartDate,
}

impl Attribute {
    /// Every supported attribute, in tag order.
    pub const ALL: [Attribute; 11] = [
        Attribute::SopInstanceUid,
        Attribute::StudyDate,
        Attribute::AccessionNumber,
        Attribute::Modality,
        Attribute::ReferringPhysicianName,
        Attribute::StudyDescription,
        Attribute::PatientName,
        Attribute::PatientId,
        Attribute::StudyInstanceUid,
        Attribute::SeriesInstanceUid,
        Attribute::PerformedProcedureStepStartDate,
    ];

    pub fn tag(&self) -> Tag {
        match self {
            Attribute::StudyInstanceUid => Tag::new(0x0020, 0x000D),
            Attribute::SeriesInstanceUid => Tag::new(0x0020, 0x000E),
            Attribute::SopInstanceUid => Tag::new(0x0008, 0x0018),
            Attribute::PatientId => Tag::new(0x0010, 0x0020),
            Attribute::PatientName => Tag::new(0x0010, 0x0010),
            Attribute::ReferringPhysicianName => Tag::new(0x0008, 0x0090),
            Attribute::StudyDate => Tag::new(0x0008, 0x0020),
            Attribute::StudyDescription => Tag::new(0x0008, 0x1030),
            Attribute::AccessionNumber => Tag::new(0x0008, 0x0050),
            Attribute::Modality => Tag::new(0x0008, 0x0060),
            Attribute::PerformedProcedureStepStartDate => Tag::new(0x0040, 0x0244),
        }
    }

    /// DICOM keyword, e.g. `StudyInstanceUID`.
    pub fn keyword(&self) -> &'static str {
        match self {
            Attribute::StudyInstanceUid => "StudyInstanceUID",
            Attribute::SeriesInstanceUid => "SeriesInstanceUID",
            Attribute::SopInstanceUid => "SOPInstanceUID",
            Attribute::PatientId => "PatientID",
            Attribute::PatientName => "PatientName",
            Attribute::ReferringPhysicianName => "ReferringPhysicianName",
            Attribute::StudyDate => "StudyDate",
            Attribute::StudyDescription => "StudyDescription",
            Attribute::AccessionNumber => "AccessionNumber",
            Attribute::Modality => "Modality",
            Attribute::PerformedProcedureStepStartDate => "PerformedProcedureStepStartDate",
        }
    }

    /// Look an attribute up by tag.
    pub fn from_tag(tag: Tag) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.tag() == tag)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Error for an attribute name that is neither a supported keyword nor tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported attribute: {0}")]
pub struct UnknownAttribute(pub String);

impl FromStr for Attribute {
    type Err = UnknownAttribute;

    /// Accepts a keyword (case-insensitive) or an 8 hex digit tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(attribute) = Tag::parse_hex(s).and_then(Attribute::from_tag) {
            return Ok(attribute);
        }
        Attribute::ALL
            .into_iter()
            .find(|a| a.keyword().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownAttribute(s.to_string()))
    }
}

/// Where an attribute is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeEntry {
    pub table: TableKind,
    pub column: &'static Column,
}

/// Resolve an attribute to its owning table and column.
pub fn resolve(attribute: Attribute) -> AttributeEntry {
    let (table, column): (TableKind, &'static Column) = match attribute {
        Attribute::StudyInstanceUid => (TableKind::Mapping, &uid_mapping::STUDY_INSTANCE_UID),
        Attribute::SeriesInstanceUid => (TableKind::Mapping, &uid_mapping::SERIES_INSTANCE_UID),
        Attribute::SopInstanceUid => (TableKind::Mapping, &uid_mapping::SOP_INSTANCE_UID),
        Attribute::PatientId => (TableKind::Study, &study_metadata_core::PATIENT_ID),
        Attribute::PatientName => (TableKind::Study, &study_metadata_core::PATIENT_NAME),
        Attribute::ReferringPhysicianName => (
            TableKind::Study,
            &study_metadata_core::REFERRING_PHYSICIAN_NAME,
        ),
        Attribute::StudyDate => (TableKind::Study, &study_metadata_core::STUDY_DATE),
        Attribute::StudyDescription => {
            (TableKind::Study, &study_metadata_core::STUDY_DESCRIPTION)
        }
        Attribute::AccessionNumber => (TableKind::Study, &study_metadata_core::ACCESSION_NUMBER),
        Attribute::Modality => (TableKind::Series, &series_metadata_core::MODALITY),
        Attribute::PerformedProcedureStepStartDate => (
            TableKind::Series,
            &series_metadata_core::PERFORMED_PROCEDURE_STEP_START_DATE,
        ),
    };

    AttributeEntry { table, column }
}
