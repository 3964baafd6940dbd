pub mod ai_grading;
pub mod scoring;
pub mod selection;
pub mod session;
