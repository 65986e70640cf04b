//! Ingestion and question-answering pipelines.
//!
//! Both pipelines take their collaborators as explicit handles so they can
//! be wired to real services by the orchestrator or to fakes in tests.

mod answer;
mod ingest;

pub use answer::{Answer, Answerer};
pub use ingest::{IngestOutcome, Ingestor};
