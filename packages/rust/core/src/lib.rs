//! Core compile pipeline for the EKS review document.
//!
//! This crate ties the catalog, risk chart, layout engine and PDF backend
//! together into one end-to-end operation ([`pipeline::generate`]).

pub mod assembler;
pub mod input;
pub mod pipeline;
pub mod references;
pub mod scheduler;

pub use assembler::{AssemblyState, ChartOutcome};
pub use input::{InputFormat, load_input, load_references, render_template};
pub use pipeline::{GenerateOutput, GenerateRequest, ProgressReporter, SilentProgress, generate};
