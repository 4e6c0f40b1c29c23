use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "version_stamp")]
#[command(about = "Generates a source file embedding a build-time version string")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Config {
    /// Path of the generated source file
    #[arg(long, value_name = "FILE", help = "Path to write the generated source file to")]
    pub out: PathBuf,

    /// Module the version constant is generated into
    #[arg(long, value_name = "NAME", help = "Module name for the generated version constant")]
    pub package: String,

    /// Repository to resolve the revision from (default: current directory)
    #[arg(long, value_name = "DIR", help = "Repository directory for the git revision lookup")]
    pub repo_dir: Option<PathBuf>,
}

impl Config {
    pub fn parse_args() -> Self {
        Config::parse()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let mut chars = self.package.chars();
        match chars.next() {
            None => return Err("Package name must not be empty".to_string()),
            Some(c) if !c.is_ascii_alphabetic() && c != '_' => {
                return Err(format!(
                    "Package name must start with a letter or underscore: {}",
                    self.package
                ));
            }
            Some(_) => {}
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!(
                "Package name may only contain letters, digits, and underscores: {}",
                self.package
            ));
        }
        Ok(())
    }
}
