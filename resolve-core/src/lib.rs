//! Core of the Resolve issue-reporting client: the report model, the remote
//! store seam, and the view state that sits between them.

pub mod card;
pub mod cell;
pub mod config;
pub mod error;
pub mod feed;
pub mod form;
pub mod memory;
pub mod report;
pub mod store;
pub mod sync;

pub use card::{BadgeTone, ReportCardView};
pub use cell::{Shared, StateCell};
pub use config::StoreConfig;
pub use error::{ConfigError, StoreError, ValidationError};
pub use feed::{fetch_reports, FeedView, ReportFeed};
pub use form::{submit_report, ReportForm, SubmitOutcome};
pub use memory::MemoryStore;
pub use report::{NewReport, Report, ReportId, ReportStatus};
pub use store::{ChangeEvent, ChangeKind, ChannelHandle, OrderBy, ReportStore, SharedStore};
pub use sync::{ReportSync, Spawner};
