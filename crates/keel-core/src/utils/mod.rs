pub mod fs;

pub use fs::{find_files, find_files_with_extension, relative_stem};
