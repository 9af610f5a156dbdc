pub mod judgment;
pub mod listing;
pub mod record;
