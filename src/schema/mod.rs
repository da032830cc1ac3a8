//! Table and column names of the latest index schema.
//!
//! Imaging metadata is split across three tables:
//!
//! ```text
//! StudyMetadataCore (ID, StudyInstanceUid, PatientId, StudyDate, ...)
//!        │ ID
//!        ▼
//! SeriesMetadataCore (ID, SeriesInstanceUid, Modality, ...)
//!
//! UIDMapping (StudyInstanceUid, SeriesInstanceUid, SopInstanceUid, Watermark)
//! ```
//!
//! `UIDMapping` holds one row per stored instance and is the only table that
//! knows SOP instance UIDs; its `Watermark` grows monotonically and is the
//! pagination key of every generated query.

use serde::Serialize;

use crate::sql::SqlType;

/// Schema the tables live in unless configured otherwise.
pub const DEFAULT_SCHEMA: &str = "dbo";

/// A physical table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Table {
    pub name: &'static str,
}

/// A physical column and its declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Column {
    pub table: &'static str,
    pub name: &'static str,
    pub sql_type: SqlType,
}

/// Identifier mapping table.
pub mod uid_mapping {
    use super::{Column, SqlType, Table};

    const TABLE_NAME: &str = "UIDMapping";

    pub static TABLE: Table = Table { name: TABLE_NAME };

    pub static STUDY_INSTANCE_UID: Column = Column {
        table: TABLE_NAME,
        name: "StudyInstanceUid",
        sql_type: SqlType::VarChar(64),
    };

    pub static SERIES_INSTANCE_UID: Column = Column {
        table: TABLE_NAME,
        name: "SeriesInstanceUid",
        sql_type: SqlType::VarChar(64),
    };

    pub static SOP_INSTANCE_UID: Column = Column {
        table: TABLE_NAME,
        name: "SopInstanceUid",
        sql_type: SqlType::VarChar(64),
    };

    pub static WATERMARK: Column = Column {
        table: TABLE_NAME,
        name: "Watermark",
        sql_type: SqlType::BigInt,
    };
}

/// Study level metadata.
pub mod study_metadata_core {
    use super::{Column, SqlType, Table};

    const TABLE_NAME: &str = "StudyMetadataCore";

    pub static TABLE: Table = Table { name: TABLE_NAME };

    pub static ID: Column = Column {
        table: TABLE_NAME,
        name: "ID",
        sql_type: SqlType::BigInt,
    };

    pub static STUDY_INSTANCE_UID: Column = Column {
        table: TABLE_NAME,
        name: "StudyInstanceUid",
        sql_type: SqlType::VarChar(64),
    };

    pub static PATIENT_ID: Column = Column {
        table: TABLE_NAME,
        name: "PatientId",
        sql_type: SqlType::NVarChar(64),
    };

    pub static PATIENT_NAME: Column = Column {
        table: TABLE_NAME,
        name: "PatientName",
        sql_type: SqlType::NVarChar(325),
    };

    pub static REFERRING_PHYSICIAN_NAME: Column = Column {
        table: TABLE_NAME,
        name: "ReferringPhysicianName",
        sql_type: SqlType::NVarChar(325),
    };

    pub static STUDY_DATE: Column = Column {
        table: TABLE_NAME,
        name: "StudyDate",
        sql_type: SqlType::Date,
    };

    pub static STUDY_DESCRIPTION: Column = Column {
        table: TABLE_NAME,
        name: "StudyDescription",
        sql_type: SqlType::NVarChar(64),
    };

    pub static ACCESSION_NUMBER: Column = Column {
        table: TABLE_NAME,
        name: "AccessionNumber",
        sql_type: SqlType::NVarChar(16),
    };
}

/// Series level metadata. `ID` references the owning study's `ID`.
pub mod series_metadata_core {
    use super::{Column, SqlType, Table};

    const TABLE_NAME: &str = "SeriesMetadataCore";

    pub static TABLE: Table = Table { name: TABLE_NAME };

    pub static ID: Column = Column {
        table: TABLE_NAME,
        name: "ID",
        sql_type: SqlType::BigInt,
    };

    pub static SERIES_INSTANCE_UID: Column = Column {
        table: TABLE_NAME,
        name: "SeriesInstanceUid",
        sql_type: SqlType::VarChar(64),
    };

    pub static MODALITY: Column = Column {
        table: TABLE_NAME,
        name: "Modality",
        sql_type: SqlType::NVarChar(16),
    };

    pub static PERFORMED_PROCEDURE_STEP_START_DATE: Column = Column {
        table: TABLE_NAME,
        name: "PerformedProcedureStepStartDate",
        sql_type: SqlType::Date,
    };
}
