pub mod endpoint;
pub mod gateway;
pub mod loading;
pub mod transport;
pub mod types;

pub use endpoint::{Endpoint, Request, Response};
pub use gateway::FetchGateway;
pub use loading::LoadingFlag;
pub use transport::{FixtureTransport, Transport};
