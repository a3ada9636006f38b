use std::fs;
use std::path::Path;

/// Creates the parent directory of the database file.
pub fn ensure_database_dir(db_path: &Path) -> std::io::Result<()> {
    match db_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

pub fn ensure_upload_dir(upload_dir: &Path) -> std::io::Result<()> {
    ensure_dir(upload_dir)
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_nested_dirs() {
        let root = std::env::temp_dir().join(format!("dealerdesk-{}", uuid::Uuid::new_v4()));
        let db_path = root.join("data").join("app.db");

        ensure_database_dir(&db_path).unwrap();
        ensure_upload_dir(&root.join("uploads/files")).unwrap();

        assert!(root.join("data").is_dir());
        assert!(root.join("uploads/files").is_dir());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_bare_file_name_needs_no_dir() {
        ensure_database_dir(Path::new("app.db")).unwrap();
    }
}
