pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;

pub use models::{Penalty, PenaltyId, PenaltyType};
pub use repository::PenaltyRepository;
pub use service::PenaltyService;
pub use types::{ApplyPenaltyRequest, PenaltyResponse};
