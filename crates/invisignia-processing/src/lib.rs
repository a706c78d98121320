//! InviSignia processing: size-tier policy selection and adaptive image
//! compression for network submission.

pub mod compression;
pub mod policy;

pub use compression::{CompressionOutcome, Compressor, OutputFormat};
pub use policy::{CompressionTarget, SizePolicy};
