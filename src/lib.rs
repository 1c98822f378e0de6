pub mod buffer;
pub mod catalog;
pub mod config;
pub mod console;
pub mod dedup;
pub mod error;
pub mod events;
pub mod frontend;
pub mod handle;
pub mod session;
pub mod surface;
pub mod tasks {
    pub mod gallery;
    pub mod loader;
    pub mod rotation;
}
