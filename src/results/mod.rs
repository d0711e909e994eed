pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;

pub use models::ResultRow;
pub use repository::ResultsRepository;
pub use service::ResultsService;
pub use types::{RaceResultsResponse, ReplaceResultsRequest, ResultEntryRequest};
