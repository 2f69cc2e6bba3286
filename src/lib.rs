pub mod commands;
pub mod error;
pub mod http;
pub mod install;
pub mod package;
pub mod registry;
pub mod runtime;

/// Test utilities for cross-platform paths and archive fixtures.
#[cfg(test)]
pub mod test_utils {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use std::path::PathBuf;

    /// Returns a test home directory path based on the platform.
    /// - Unix: `/home/user`
    /// - Windows: `C:\Users\user`
    pub fn test_home() -> PathBuf {
        #[cfg(not(windows))]
        {
            PathBuf::from("/home/user")
        }
        #[cfg(windows)]
        {
            PathBuf::from(r"C:\Users\user")
        }
    }

    /// The default store directory under [`test_home`].
    pub fn test_store() -> PathBuf {
        test_home()
            .join(".scaffold")
            .join("dependencies")
            .join("node_modules")
    }

    /// Builds an in-memory `.tgz` from `(path, content, mode)` triples.
    pub fn build_tgz(files: &[(&str, &str, u32)]) -> Vec<u8> {
        let mut tar_builder = tar::Builder::new(Vec::new());
        for (name, content, mode) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_path(name).unwrap();
            header.set_mode(*mode);
            header.set_cksum();
            tar_builder.append(&header, content.as_bytes()).unwrap();
        }
        let tar = tar_builder.into_inner().unwrap();

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&tar).unwrap();
        encoder.finish().unwrap()
    }
}
