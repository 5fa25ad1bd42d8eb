//! Types shared between the feedback server and anything that reads its data.

pub mod model;
pub mod requests;
