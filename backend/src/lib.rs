//! Backend library modules.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;

#[cfg(test)]
pub(crate) mod test_support;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
