pub mod dashboard;
pub mod insights;
pub mod orders;
