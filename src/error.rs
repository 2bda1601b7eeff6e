//! Command-line Error Types
//!
//! Every failure is raised into one of these kinds, keeping the lower-level
//! error tree as its children for the final report.

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("record store unavailable")]
    Store,
    #[display("personal data export failed")]
    Export,
    #[display("personal data erasure failed")]
    Erase,
    #[display("personal data erasure is disabled (set enable_eraser to register the eraser)")]
    EraserDisabled,
    #[display("could not read records from {}", _0.display())]
    Input(#[error(not(source))] PathBuf),
    #[display("could not write output")]
    Output,
}
