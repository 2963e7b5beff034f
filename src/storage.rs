mod applier;
mod text;

pub use applier::{Applier, ApplyError, ApplyOutcome};
pub use text::{FileStore, TextSink, TextSource};
