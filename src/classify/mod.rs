pub mod standards;

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("target path does not exist: {0}")]
    TargetNotFound(PathBuf),

    #[error("invalid exclusion pattern: {0}")]
    Pattern(#[from] globset::Error),
}

/// Outcome of the file discovery pass: the files to analyze, in a stable
/// traversal order, and the set of languages detected among them.
#[derive(Debug, Default)]
pub struct Classification {
    pub files: Vec<PathBuf>,
    pub languages: BTreeSet<String>,
}

/// Map a file extension to its language tag. Extensions are matched
/// case-insensitively; anything outside this table is skipped entirely.
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "py" => Some("python"),
        "js" => Some("javascript"),
        "ts" => Some("typescript"),
        "java" => Some("java"),
        "cpp" | "c" => Some("cpp"),
        "cs" => Some("csharp"),
        "go" => Some("go"),
        "rb" => Some("ruby"),
        "php" => Some("php"),
        _ => None,
    }
}

/// Language tag for a path, from its extension.
pub fn language_for(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(language_for_extension)
}

/// Walk `root` and classify every file with a recognized extension.
///
/// Exclusion patterns are shell globs (`*`, `?`, `[...]`) matched against
/// *names*, not paths: a directory whose name matches is pruned before it is
/// descended into, so none of its descendants are visited; a file whose base
/// name matches is dropped. A single-file root is classified alone and no
/// directory exclusion applies.
///
/// Directory entries are sorted before recursing so the output order is
/// stable for a given input tree.
pub fn classify(root: &Path, exclude_patterns: &[String]) -> Result<Classification, ClassifyError> {
    if !root.exists() {
        return Err(ClassifyError::TargetNotFound(root.to_path_buf()));
    }

    let excludes = build_glob_set(exclude_patterns)?;
    let mut classification = Classification::default();

    if root.is_file() {
        record_file(root, &mut classification);
        return Ok(classification);
    }

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            // The root itself is never pruned, only its descendants.
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            !name_matches(&excludes, entry.file_name())
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                // A root that vanished mid-walk is the same failure as a
                // missing target; anything else is skipped with a warning.
                if err.io_error().map(|io| io.kind()) == Some(std::io::ErrorKind::NotFound)
                    && err.depth() == 0
                {
                    return Err(ClassifyError::TargetNotFound(root.to_path_buf()));
                }
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        if name_matches(&excludes, entry.file_name()) {
            continue;
        }
        record_file(entry.path(), &mut classification);
    }

    debug!(
        files = classification.files.len(),
        languages = classification.languages.len(),
        "classification complete"
    );
    Ok(classification)
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}

fn name_matches(set: &GlobSet, name: &std::ffi::OsStr) -> bool {
    set.is_match(Path::new(name))
}

fn record_file(path: &Path, classification: &mut Classification) {
    if let Some(language) = language_for(path) {
        classification.languages.insert(language.to_string());
        classification.files.push(path.to_path_buf());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_language_table() {
        assert_eq!(language_for_extension("py"), Some("python"));
        assert_eq!(language_for_extension("PY"), Some("python"));
        assert_eq!(language_for_extension("c"), Some("cpp"));
        assert_eq!(language_for_extension("cpp"), Some("cpp"));
        assert_eq!(language_for_extension("md"), None);
    }

    #[test]
    fn test_classify_directory() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "app.py", "print('hi')\n");
        touch(temp.path(), "util.js", "console.log('hi');\n");
        touch(temp.path(), "README.md", "# docs\n");

        let result = classify(temp.path(), &[]).unwrap();
        assert_eq!(result.files.len(), 2);
        assert!(result.languages.contains("python"));
        assert!(result.languages.contains("javascript"));
        // Unrecognized extension appears in neither files nor languages
        assert!(!result.files.iter().any(|f| f.ends_with("README.md")));
    }

    #[test]
    fn test_classify_single_file() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "main.go", "package main\n");

        let result = classify(&temp.path().join("main.go"), &[]).unwrap();
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.languages.iter().collect::<Vec<_>>(), ["go"]);
    }

    #[test]
    fn test_classify_single_file_unknown_extension() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "notes.txt", "hello\n");

        let result = classify(&temp.path().join("notes.txt"), &[]).unwrap();
        assert!(result.files.is_empty());
        assert!(result.languages.is_empty());
    }

    #[test]
    fn test_missing_target() {
        let err = classify(Path::new("/no/such/path"), &[]).unwrap_err();
        assert!(matches!(err, ClassifyError::TargetNotFound(_)));
        assert!(err.to_string().contains("/no/such/path"));
    }

    #[test]
    fn test_directory_prune_is_transitive() {
        let temp = TempDir::new().unwrap();
        let ignored = temp.path().join("__pycache__");
        let nested = ignored.join("deep");
        fs::create_dir_all(&nested).unwrap();
        touch(&ignored, "cached.py", "x = 1\n");
        touch(&nested, "deeper.py", "y = 2\n");
        touch(temp.path(), "kept.py", "z = 3\n");

        let result = classify(temp.path(), &["__pycache__".to_string()]).unwrap();
        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].ends_with("kept.py"));
    }

    #[test]
    fn test_file_excluded_by_base_name_glob() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "app.py", "print('hi')\n");
        touch(temp.path(), "generated_app.py", "print('gen')\n");

        let result = classify(temp.path(), &["generated_*".to_string()]).unwrap();
        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].ends_with("app.py"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let temp = TempDir::new().unwrap();
        let err = classify(temp.path(), &["[".to_string()]).unwrap_err();
        assert!(matches!(err, ClassifyError::Pattern(_)));
    }

    #[test]
    fn test_stable_ordering() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.py", "b\n");
        touch(temp.path(), "a.py", "a\n");
        touch(temp.path(), "c.py", "c\n");

        let first = classify(temp.path(), &[]).unwrap();
        let second = classify(temp.path(), &[]).unwrap();
        assert_eq!(first.files, second.files);
        assert!(first.files[0].ends_with("a.py"));
        assert!(first.files[2].ends_with("c.py"));
    }
}
