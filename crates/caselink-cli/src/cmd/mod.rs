pub mod attach;
pub mod list;
