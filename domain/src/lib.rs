pub mod figures;
pub mod models;
