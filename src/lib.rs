//! Impedance-spectroscopy post-processing.
//!
//! Turns RLC-meter sweeps (`f; |Z|; -φ`) measured on a disc-shaped sample into
//! impedance, conductivity, permittivity and electric-modulus tables, written
//! as one workbook per batch plus Zview and plain-text files per input.

pub mod batch;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod format;

pub use batch::{BatchOrchestrator, BatchReport, FileReport};
pub use config::{OutputLayout, RunConfig};
pub use data::geometry::GeometryConstants;
pub use error::{ErrorKind, ProcessingError, SinkError};
