mod archive;
mod release;

pub use archive::zip_directory;
pub use release::{
    build_core_release, build_extras, build_full_release, cleanup, core_archive_name,
    extra_archive_name, full_archive_name, EXTRAS_DIR,
};
