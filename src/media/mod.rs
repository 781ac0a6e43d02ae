pub mod listing;
pub mod mime;
pub mod root;
