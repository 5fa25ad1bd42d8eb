pub mod link;
pub mod submission;
