//! Data layer: core types, loading, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .xlsx / .txt
//!        │
//!        ▼
//!   ┌──────────┐      ┌───────────┐
//!   │  loader   │ ◄──► │   cache    │  content hash → Arc<Dataset>
//!   └──────────┘      └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Dataset  │  Vec<SeasonRow>, normalized headers
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  season range + clubs → FilteredView
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate  │  summary + derived views per chart
//!   └───────────┘
//! ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;

pub use aggregate::DashboardViews;
pub use cache::LoadCache;
pub use error::{LoadError, PipelineError};
pub use filter::{filter, FilterSpec, FilteredView};
pub use loader::SourceFormat;
pub use model::{Dataset, SeasonRow};
