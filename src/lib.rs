pub mod args;
pub mod commands;
mod config;
pub mod dom;
pub mod editor;
mod error;
pub mod extract;
pub mod filter;
pub mod model;
pub mod page;
pub mod reconcile;
pub mod registry;
pub mod submit;
pub mod summary;
mod utils;
pub mod view;

#[cfg(test)]
mod test;

pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use page::{Page, Snapshot};
pub use submit::Mode;
