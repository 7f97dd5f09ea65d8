pub mod client;
pub mod handlers;
pub mod models;
pub mod normalize;
mod service;

pub use service::{WeatherError, WeatherService};
