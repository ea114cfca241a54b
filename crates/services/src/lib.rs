#![forbid(unsafe_code)]

pub mod app_services;
pub mod coach_service;
pub mod error;
pub mod progress_service;
pub mod session_service;

pub use coach_core::Clock;

pub use app_services::{AppServices, SeedReport};
pub use coach_service::CoachService;
pub use error::{AppServicesError, CoachServiceError, ProgressServiceError, SessionServiceError};
pub use progress_service::ProgressService;
pub use session_service::SessionService;
