//! Cubeline Core - streaming dimension building and OData collection fetching
//!
//! This crate provides the model (dimensions, hierarchies, elements, edges),
//! the streaming hierarchy builder, and the paged / change-tracked fetchers
//! shared by the source and target adapters.

pub mod builder;
pub mod error;
pub mod logging;
pub mod model;
pub mod odata;
pub mod paging;
pub mod progress;
pub mod session;
pub mod shutdown;
pub mod test_utils;
pub mod tracking;

// Re-exports for convenience
pub use builder::{HierarchyBuilder, Level, Node};
pub use error::{BuildError, FetchError, ModelError};
pub use logging::{ProgressLogger, Verbosity, init_logging};
pub use model::{Dimension, Edge, Element, Hierarchy, PlanStep};
pub use odata::{CollectionQuery, Page};
pub use paging::{DEFAULT_PAGE_SIZE, FetchSummary, PageInfo, PagedFetcher};
pub use progress::{PageProgress, ProgressContext, SharedProgress, fmt_num};
pub use session::{SHARED_RUNTIME, Session, SessionConfig, Transport};
pub use shutdown::CancelToken;
pub use tracking::{ChangeTracker, Continuation, TrackOutcome, TrackState, TrackSummary};
