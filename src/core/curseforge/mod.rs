mod client;
mod model;

pub use client::{CurseForgeClient, DEFAULT_BASE_URL};
pub use model::{match_version_id, GameVersionRecord, ReleaseType, UploadMetadata};
