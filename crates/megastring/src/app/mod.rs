//! Application layer: the build pipeline stages and the change watcher.

pub mod bundle;
pub mod gather;
pub mod load;
pub mod pipeline;
pub mod sources;
pub mod watch;
