pub mod item;
pub mod user;
