//! Data model for the bucket library: buckets, associations, documents,
//! graph snapshots, archives, and query types.

pub mod archive;
pub mod association;
pub mod bucket;
pub mod document;
pub mod graph;
pub mod query;

pub use archive::{ArchivedDocument, BucketArchive};
pub use association::{AssociationKind, ProjectAssociation};
pub use bucket::{Bucket, BucketScope, BucketStats, IndexStatus};
pub use document::DocumentRecord;
pub use graph::{Community, EntityKind, GraphChunk, GraphEntity, GraphRelationship, GraphSnapshot};
pub use query::{PassageOrigin, QueryConfig, QueryMode, QueryResponse, RankedPassage};
