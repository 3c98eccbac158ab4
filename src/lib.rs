pub mod archive;
pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod remote;
pub mod sync;
pub mod transform;
