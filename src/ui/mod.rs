pub mod dashboard;
pub mod dedupe;
pub mod event;
pub mod intent;
pub mod query_groups;
pub mod registry;
pub mod runtime;
pub mod scanner;
pub mod schema;
pub mod workspace;
