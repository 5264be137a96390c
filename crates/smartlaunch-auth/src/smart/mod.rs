//! SMART on FHIR discovery documents.

pub mod discovery;

pub use discovery::OpenIdConfiguration;
