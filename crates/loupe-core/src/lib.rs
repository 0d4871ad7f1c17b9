pub mod buffer;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod io;
pub mod pan;
pub mod resample;
pub mod scheduler;
pub mod transform;
pub mod zoom;
