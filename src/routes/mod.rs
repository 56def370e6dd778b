pub mod electricity;
pub mod health;
