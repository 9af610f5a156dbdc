pub mod classifier;
pub mod notifier;
pub mod source;
