pub mod features;
pub mod health;
pub mod models;
pub mod predict;
