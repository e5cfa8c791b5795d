mod collector;
mod fetcher;

pub use collector::collect_dependencies;
pub use fetcher::{extract_zip_file, ArchiveSource, DependencyFetcher, HttpDependencyFetcher};
