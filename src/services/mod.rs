// SPDX-License-Identifier: MIT

//! Services module - the collection pipeline stages.

pub mod archive;
pub mod collector;
pub mod daily;
pub mod fitbit;
pub mod flatten;
pub mod probe;
pub mod tokens;

pub use archive::{ArchiveAssembler, Bundle};
pub use collector::CollectionOrchestrator;
pub use daily::{DailyFetchReport, DailyFetcher};
pub use fitbit::FitbitClient;
pub use flatten::{flatten, FlattenedRecord};
pub use probe::{RangeDiagnostic, RangeFetcher, SLEEP_READ_SCOPE};
pub use tokens::TokenLifecycleManager;
