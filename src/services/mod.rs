pub mod export;
pub mod sessions;
pub mod split;
pub mod store;
