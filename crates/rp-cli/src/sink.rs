use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Write generated text to `path`, replacing any existing file.
///
/// The file always ends with exactly one newline.
///
/// # Errors
///
/// Fails with the underlying I/O cause when the file cannot be written.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    let mut content = text.trim_end_matches('\n').to_string();
    content.push('\n');
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write to: {}", path.display()))?;
    info!("Wrote output to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_single_trailing_newline() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("out.puml");

        write_text(&path, "@startuml\n@enduml\n\n").expect("write");
        assert_eq!(
            std::fs::read_to_string(&path).expect("read back"),
            "@startuml\n@enduml\n"
        );

        write_text(&path, "@enduml").expect("overwrite");
        assert_eq!(std::fs::read_to_string(&path).expect("read back"), "@enduml\n");
    }

    #[test]
    fn missing_directory_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing").join("out.puml");
        let error = write_text(&path, "x").expect_err("parent does not exist");
        assert!(error.to_string().contains("out.puml"));
    }
}
