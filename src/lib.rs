//! Data normalization, analytics and seat allocation for an
//! international-student roster.

pub mod analytics;
pub mod density;
pub mod error;
pub mod geography;
pub mod loader;
pub mod models;
pub mod normalizer;
pub mod planner;
pub mod records;
pub mod report;
pub mod terms;
