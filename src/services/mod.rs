pub mod daily;
pub mod stats;
