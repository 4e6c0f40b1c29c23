use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write the generated version module to `path`, replacing any existing file.
///
/// The content lands in a temp file next to the target first and is persisted
/// over it, so a build that reads the file never observes a partial write.
pub fn write_version_file(path: &Path, package: &str, version: &str) -> Result<()> {
    let contents = render_module(package, version);

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write generated module {}", package))?;
    file.flush()?;

    file.into_temp_path()
        .persist(path)
        .with_context(|| format!("Failed to persist generated file to {}", path.display()))?;

    tracing::debug!("wrote {}", path.display());
    Ok(())
}

fn render_module(package: &str, version: &str) -> String {
    let version = quote(version);
    format!(
        r#"// THIS FILE WAS AUTOGENERATED BY version_stamp. DO NOT EDIT!

pub mod {package} {{
    /// Build version string, stamped before compilation.
    pub const VERSION: &str = {version};
}}
"#
    )
}

fn quote(value: &str) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn renders_module_with_constant() {
        let module = render_module("mypkg", "1.0 (git:abc1234)");
        assert!(module.starts_with("// THIS FILE WAS AUTOGENERATED"));
        assert!(module.contains("pub mod mypkg {"));
        assert!(module.contains(r#"pub const VERSION: &str = "1.0 (git:abc1234)";"#));
    }

    #[test]
    fn quote_escapes_special_characters() {
        assert_eq!(quote(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn writes_the_full_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("version_gen.rs");

        write_version_file(&path, "stamped", "0.1.1-dev (git:abc1234)").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("pub mod stamped {"));
        assert!(contents.contains("0.1.1-dev (git:abc1234)"));
    }

    #[test]
    fn overwrites_an_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("version_gen.rs");
        std::fs::write(&path, "stale").unwrap();

        write_version_file(&path, "stamped", "fresh").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("stale"));
        assert!(contents.contains("fresh"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no/such/dir/version_gen.rs");
        assert!(write_version_file(&path, "stamped", "v").is_err());
    }
}
