//! Datasource sync for sbmig.
//!
//! Reconciles locally declared datasources (dimensions plus key/value
//! entries) with a remote space through its management API. Sync is
//! create-or-update only: nothing that exists remotely is ever deleted, and
//! remote dimensions are merged with local ones rather than replaced.
//!
//! Planning is pure and can be used on its own:
//!
//! ```
//! use sbmig_sync::{plan_datasource, Dimension, LocalDatasource, SyncAction};
//!
//! let local = LocalDatasource {
//!     name: "colors".into(),
//!     slug: "colors".into(),
//!     dimensions: vec![Dimension::new("de", "de")],
//!     datasource_entries: Vec::new(),
//! };
//! let plan = plan_datasource(&local, &[]);
//! assert_eq!(plan.action(), SyncAction::Create);
//! assert_eq!(plan.payload().dimensions, plan.payload().dimensions_attributes);
//! ```
//!
//! Running a sync needs a [`Transport`]; [`HttpTransport`] talks to the real
//! API:
//!
//! ```no_run
//! use sbmig_sync::{HttpTransport, Space, SpaceConfig, SyncOrchestrator, DEFAULT_API_URL};
//! use std::path::PathBuf;
//! use std::time::Duration;
//!
//! let transport = HttpTransport::new(DEFAULT_API_URL, "token", Duration::from_secs(30))?;
//! let orchestrator = SyncOrchestrator::new(Space::new(transport, SpaceConfig::new("12345")));
//! let report = futures::executor::block_on(
//!     orchestrator.sync_datasources(&[PathBuf::from("colors.sb.datasource.json")]),
//! );
//! println!("{}", report.format_summary());
//! # Ok::<(), sbmig_sync::TransportError>(())
//! ```

#![deny(unsafe_code)]

pub mod entries;
pub mod error;
pub mod http;
pub mod local;
pub mod models;
pub mod orchestrator;
pub mod pagination;
pub mod reconcile;
pub mod remote;
pub mod report;
pub mod transport;

pub use entries::sync_entries;
pub use error::{ResourceKind, SyncError, SyncResult, TransportError};
pub use http::{HttpTransport, DEFAULT_API_URL};
pub use local::{load_datasource, load_datasources};
pub use models::{
    DatasourcePayload, Dimension, EntryPayload, LocalDatasource, LocalEntry, PresetRef,
    RemoteComponent, RemoteDatasource, RemoteEntry,
};
pub use orchestrator::SyncOrchestrator;
pub use pagination::collect_all_pages;
pub use reconcile::{
    apply_datasource, match_remote, merge_dimensions, plan_datasource, plan_entry,
    AppliedDatasource, DatasourcePlan, EntryPlan, SyncAction,
};
pub use remote::{
    find_by_name, Space, SpaceConfig, DEFAULT_CONCURRENCY, DEFAULT_PER_PAGE, MAX_PER_PAGE,
};
pub use report::{
    DatasourceOutcome, EntryBatchReport, EntryFailure, PipelineStage, SkipReason, SyncReport,
};
pub use transport::{ApiResponse, Query, Transport};
