//! # lore-registry
//!
//! The bucket registry (metadata catalog, indexing-status state machine)
//! and the scope manager (library/local/legacy rules, import/promote/export,
//! project associations, legacy migration).
//!
//! The registry is an explicit injectable component with internal locking —
//! no process-wide singletons. All mutating calls serialize behind one
//! RwLock; reads see a consistent snapshot (a bucket's scope is never
//! observed mid-promotion).

pub mod legacy;
pub mod registry;
pub mod scope;
pub mod store;

pub use registry::{BucketRegistry, LibraryStats};
pub use scope::{ProjectBuckets, ScopeManager};
pub use store::RegistryStore;
