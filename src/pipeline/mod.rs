//! Pipeline module - one deal in, one uploaded PDF recorded on the deal out.
//!
//! - `orchestrator` - sequencing of the stages and the failure write-back
//! - `filename` - storage filename derived from the bundle

pub mod filename;
pub mod orchestrator;

pub use filename::{derive_pdf_filename, UNKNOWN_CONTACT};
pub use orchestrator::{failure_fields, success_fields, DealPdfPipeline, PipelineOutcome};
