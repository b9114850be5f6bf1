//! Package identifiers and the remote package index.
//!
//! The index is owned by the remote community registry; this crate only reads
//! it. Dependency identifiers use the wire format `Owner-Name-Version`.

mod ident;
mod index;
mod source;

pub use ident::PackageIdent;
pub use index::{Package, PackageIndex, PackageVersion};
pub use source::{IndexSource, RemoteIndexSource};

#[cfg(test)]
pub use source::MockIndexSource;
