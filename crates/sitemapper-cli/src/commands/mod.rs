//! Command implementations for the sitemapper CLI

mod archive;
mod extract;
mod serve;

pub use archive::execute as archive_urls;
pub use extract::execute as extract_urls;
pub use serve::execute as serve;
