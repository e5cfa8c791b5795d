mod client;
mod model;

pub use client::{
    GitHubReleasesClient, DEFAULT_API_BASE, DEFAULT_TARGET_BRANCH, DEFAULT_UPLOAD_BASE,
};
pub use model::{release_id, ReleasePayload, RepoSlug, REPO_SLUG_ENV};
