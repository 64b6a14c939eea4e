pub mod snapshot;

pub use snapshot::JsonSnapshot;
