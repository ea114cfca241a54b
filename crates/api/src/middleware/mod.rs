pub mod cors;

pub use cors::setup_cors;
