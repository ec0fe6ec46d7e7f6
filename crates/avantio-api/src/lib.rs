// avantio-api: Async Rust client for the Avantio owner portal's internal AJAX endpoints

pub mod endpoints;
pub mod error;
pub mod models;
pub mod pagination;
pub mod session;
pub mod transport;

pub use error::Error;
pub use models::{Accommodation, AccommodationImage, Agent, Booking, BookingStatus, Guests};
pub use pagination::PaginationRequest;
pub use session::PortalSession;
pub use transport::TransportConfig;
