//! Personal data export for WordCamp application records.
//!
//! Application records carry organizer and wrangler contact details in plain
//! metadata fields. To answer a data-subject access request the [`Exporter`]
//! pages through the records that might mention an address, checks every
//! field listed in the [`FieldCatalog`] for an exact match, and reports each
//! match together with the fields that travel with it (names, phone numbers,
//! postal addresses).
//!
//! Pagination is driven by the caller: ask for page 1, then 2, and so on
//! until a page reports `done`. [`Registry::export_all`] does exactly that for
//! every registered exporter.
//!
//! The [`Eraser`] honours the same contract but is a placeholder; see
//! [`EraseOutcome`].

mod catalog;
mod erase;
pub mod error;
mod export;
mod page;
mod query;
mod registry;
mod settings;

pub use crate::catalog::{EMAIL_FIELDS, FieldCatalog, FieldDefinition, email_postmeta_keys};
pub use crate::erase::{EraseOutcome, ErasePage, Eraser};
pub use crate::export::{ExportPage, Exporter, MatchResult};
pub use crate::page::{coerce_page, is_done};
pub use crate::query::{PER_PAGE, records_query};
pub use crate::registry::{
    DEFAULT_MAX_PAGES, EXPORTER_ID, ExportReport, FRIENDLY_NAME, PersonalDataEraser, PersonalDataExporter,
    Registration, Registry, register_personal_data_erasers, register_personal_data_exporters,
};
pub use crate::settings::Settings;
