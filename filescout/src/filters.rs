//! Structural filters applied by the walker before a file becomes a candidate.
//!
//! These look at the file name only. Matching is a literal, case-sensitive
//! suffix test so that multi-part extensions such as `tar.gz` can be listed.
use std::path::Path;

/// Archives with this suffix are never searched.
pub const EXCLUDED_SUFFIX: &str = ".tar.gz";

/// Checks if a file name carries the excluded archive suffix
pub fn is_excluded_archive(name: &str) -> bool {
    name.ends_with(EXCLUDED_SUFFIX)
}

/// Checks if a file name ends in `.` followed by one of the allowed extensions.
/// An empty list accepts every name.
pub fn has_allowed_extension(name: &str, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    extensions.iter().any(|ext| {
        name.len() > ext.len()
            && name.ends_with(ext.as_str())
            && name.as_bytes()[name.len() - ext.len() - 1] == b'.'
    })
}

/// Determines if a file should be handed to the workers
pub fn should_include_file(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy();
    !is_excluded_archive(&name) && has_allowed_extension(&name, extensions)
}

/// Parses a comma-separated extension list such as `txt,md,py`.
///
/// Entries are trimmed, a leading dot is dropped and blank entries are ignored,
/// so `""` yields the empty (accept all) filter.
pub fn parse_extension_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|e| e.trim().trim_start_matches('.'))
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_is_excluded_archive() {
        assert!(is_excluded_archive("archive.tar.gz"));
        assert!(is_excluded_archive(".tar.gz"));
        assert!(!is_excluded_archive("archive.tar"));
        assert!(!is_excluded_archive("archive.gz"));
        assert!(!is_excluded_archive("archive.TAR.GZ"));
    }

    #[test]
    fn test_has_allowed_extension() {
        let txt = exts(&["txt"]);
        assert!(has_allowed_extension("notes.txt", &txt));
        assert!(!has_allowed_extension("notes.md", &txt));
        assert!(!has_allowed_extension("notes.TXT", &txt)); // case-sensitive
        assert!(!has_allowed_extension("notestxt", &txt)); // needs the dot
        assert!(!has_allowed_extension("txt", &txt));
        assert!(has_allowed_extension(".txt", &txt));

        let multi = exts(&["md", "tar.bz2"]);
        assert!(has_allowed_extension("README.md", &multi));
        assert!(has_allowed_extension("backup.tar.bz2", &multi));
        assert!(!has_allowed_extension("main.rs", &multi));

        // No filter means every name is accepted
        assert!(has_allowed_extension("anything", &[]));
        assert!(has_allowed_extension("main.rs", &[]));
    }

    #[test]
    fn test_should_include_file() {
        let gz = exts(&["gz"]);
        assert!(!should_include_file(Path::new("/data/a.tar.gz"), &gz));
        assert!(should_include_file(Path::new("/data/a.gz"), &gz));

        assert!(should_include_file(Path::new("/data/a.txt"), &[]));
        assert!(!should_include_file(Path::new("/data/c.tar.gz"), &[]));
        assert!(!should_include_file(Path::new("/"), &[]));

        // Only the file name is tested, never the directories above it
        let txt = exts(&["txt"]);
        assert!(!should_include_file(Path::new("/data/dir.txt/a.md"), &txt));
        assert!(should_include_file(Path::new("/data/x.tar.gz/a.txt"), &txt));
    }

    #[test]
    fn test_parse_extension_list() {
        assert_eq!(parse_extension_list("txt,md,py"), exts(&["txt", "md", "py"]));
        assert_eq!(parse_extension_list(" txt , .md ,,"), exts(&["txt", "md"]));
        assert!(parse_extension_list("").is_empty());
        assert!(parse_extension_list(" , ").is_empty());
    }
}
