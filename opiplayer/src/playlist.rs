//! Concat playlist consumed by the muxer.

use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

/// File name of the concat list inside the media directory.
pub const CONCAT_FILE: &str = ".concat.txt";

const VIDEO_SUFFIXES: [&str; 4] = [".mkv", ".mp4", ".avi", ".webm"];

/// Regular files of `dir` with a video extension, in enumeration order.
pub fn list_video_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy().to_lowercase();
            VIDEO_SUFFIXES.iter().any(|ext| name.ends_with(ext))
        })
        .map(|entry| dir.join(entry.file_name()))
        .collect()
}

/// Renders the concat list: one `file 'PATH'` line per video, quotes doubled.
pub fn render_concat(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|f| format!("file '{}'\n", f.to_string_lossy().replace('\'', "''")))
        .collect()
}

/// Writes the concat list (mode 0600) and returns its path.
pub fn write_concat(dir: &Path, files: &[PathBuf]) -> std::io::Result<PathBuf> {
    let path = dir.join(CONCAT_FILE);
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(&path)?;
    file.write_all(render_concat(files).as_bytes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_concat_escapes_quotes() {
        let files = vec![
            PathBuf::from("/srv/media/a_b.mkv"),
            PathBuf::from("/srv/it's/c.mp4"),
        ];
        assert_eq!(
            render_concat(&files),
            "file '/srv/media/a_b.mkv'\nfile '/srv/it''s/c.mp4'\n"
        );
    }

    #[test]
    fn test_list_video_files_filters() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.MKV"), b"").unwrap();
        std::fs::write(dir.path().join("b.webm"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();
        std::fs::write(dir.path().join(CONCAT_FILE), b"").unwrap();
        std::fs::create_dir(dir.path().join("dir.mp4")).unwrap();

        let mut names: Vec<String> = list_video_files(dir.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();

        assert_eq!(names, vec!["a.MKV", "b.webm"]);
    }

    #[test]
    fn test_write_concat_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let files = vec![dir.path().join("c.mp4")];
        let path = write_concat(dir.path(), &files).unwrap();

        assert_eq!(path, dir.path().join(".concat.txt"));
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            format!("file '{}'\n", files[0].display())
        );
    }
}
