//! Client-side stores, each exclusively owning the data it accumulates.
//!
//! Stores only change through their own operations: a fetch, `invalidate`,
//! or a wholesale `replace` pushed by the approval flow.

mod directory;
mod employee;
mod paginated;

pub use directory::EmployeeDirectory;
pub use employee::EmployeeFeedStore;
pub use paginated::PaginatedFeedStore;
