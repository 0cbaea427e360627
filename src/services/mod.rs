//! Service layer: token caching, flow metadata, and the task operations
//! exposed over HTTP.

pub mod assignment_service;
pub mod flow_metadata_store;
pub mod query_contract;
pub mod task_history_service;
pub mod task_query_service;
pub mod token_cache;

pub use assignment_service::{AssignmentService, ClaimRequest};
pub use flow_metadata_store::FlowMetadataStore;
pub use query_contract::QueryContract;
pub use task_history_service::{TaskHistoryService, DEFAULT_HISTORY_HOURS, MAX_HISTORY_HOURS};
pub use task_query_service::TaskQueryService;
pub use token_cache::{Clock, TokenCache};
