//! Lexical path helpers. Nothing here touches the filesystem.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by processing `.` and `..` components lexically.
/// This does not access the filesystem and does not follow symlinks.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match result.components().next_back() {
                Some(Component::Normal(_)) => {
                    result.pop();
                }
                // `..` at the root is the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                // Leading `..` of a relative path stays
                _ => result.push(component),
            },
            _ => {
                result.push(component);
            }
        }
    }
    result
}

/// Check if a path is under a given directory by comparing normalized path components.
///
/// `/store/pkg/../../etc/passwd` is NOT under `/store`.
pub fn is_path_under(path: &Path, dir: &Path) -> bool {
    let normalized_path = normalize_path(path);
    let normalized_dir = normalize_path(dir);

    let path_components: Vec<_> = normalized_path.components().collect();
    let dir_components: Vec<_> = normalized_dir.components().collect();

    if path_components.len() < dir_components.len() {
        return false;
    }

    dir_components
        .iter()
        .zip(path_components.iter())
        .all(|(d, p)| d == p)
}

/// Make `path` absolute against `base` (if relative) and normalize it.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_simple() {
        assert_eq!(
            normalize_path(Path::new("/home/user/.scaffold")),
            PathBuf::from("/home/user/.scaffold")
        );
    }

    #[test]
    fn test_normalize_path_with_dot_and_parent() {
        assert_eq!(
            normalize_path(Path::new("/store/./_pkg@1.0.0@pkg/lib/../index.js")),
            PathBuf::from("/store/_pkg@1.0.0@pkg/index.js")
        );
    }

    #[test]
    fn test_normalize_path_parent_at_root() {
        assert_eq!(normalize_path(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize_path(Path::new("/../..")), PathBuf::from("/"));
        assert_eq!(normalize_path(Path::new("/a/../../b")), PathBuf::from("/b"));
    }

    #[test]
    fn test_normalize_path_relative_parents_accumulate() {
        assert_eq!(normalize_path(Path::new("../..")), PathBuf::from("../.."));
        assert_eq!(normalize_path(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_is_path_under_root_escape() {
        assert!(!is_path_under(Path::new("/../etc/passwd"), Path::new("/store")));
        assert!(is_path_under(Path::new("/../store/pkg"), Path::new("/store")));
    }

    #[test]
    fn test_normalize_path_relative_keeps_leading_parent() {
        assert_eq!(
            normalize_path(Path::new("../a/./b")),
            PathBuf::from("../a/b")
        );
    }

    #[test]
    fn test_is_path_under_simple() {
        assert!(is_path_under(
            Path::new("/store/_pkg@1.0.0@pkg/index.js"),
            Path::new("/store")
        ));
        assert!(is_path_under(Path::new("/store"), Path::new("/store")));
    }

    #[test]
    fn test_is_path_under_partial_component_match() {
        // /store-old is not under /store even though the string starts with it
        assert!(!is_path_under(
            Path::new("/store-old/file"),
            Path::new("/store")
        ));
    }

    #[test]
    fn test_is_path_under_directory_traversal() {
        assert!(!is_path_under(
            Path::new("/store/pkg/../../etc/passwd"),
            Path::new("/store")
        ));
        assert!(is_path_under(
            Path::new("/store/pkg/../other/file"),
            Path::new("/store")
        ));
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize(Path::new("/store/pkg"), Path::new("./lib/index.js")),
            PathBuf::from("/store/pkg/lib/index.js")
        );
        assert_eq!(
            absolutize(Path::new("/store/pkg"), Path::new("/abs/main.js")),
            PathBuf::from("/abs/main.js")
        );
    }
}
