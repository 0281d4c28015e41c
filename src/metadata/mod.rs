//! Class and method metadata consumed by usage providers
//!
//! The dead-code analyzer owns reflection; this module only models what it
//! exports. [`MetadataAccessor`] is the seam, [`ClassIndex`] the in-memory
//! implementation loaded from a [`MetadataSnapshot`].

mod descriptor;
mod index;
mod snapshot;

pub use descriptor::{
    ClassDescriptor, ClassKind, ClassName, MetadataTag, MethodDescriptor, MethodMetadata,
    TagArguments, TagValue,
};
pub use index::ClassIndex;
pub use snapshot::{ClassRecord, MetadataSnapshot, MethodRecord, SnapshotError};

/// Read-only view over class metadata
///
/// Missing metadata is an empty collection, never an error.
pub trait MetadataAccessor: Send + Sync {
    /// Look up a class by name (case-insensitive, leading `\` ignored)
    fn class(&self, name: &str) -> Option<&ClassDescriptor>;

    /// All known classes
    fn classes(&self) -> &[ClassDescriptor];
}
