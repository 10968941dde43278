mod app;
pub mod geometry;
pub mod gesture;
pub mod resize;
pub mod surface;
pub mod throttle;
pub mod time_mapper;
pub mod views;

pub use app::PlannerApp;
