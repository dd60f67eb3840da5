//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use vsxpub_core::config::{DEFAULT_CATALOGUE_FILE, DEFAULT_ARTIFACTS_DIR, DEFAULT_REGISTRY_URL};
use vsxpub_core::Settings;

/// vsxpub - Build third-party editor extensions and publish them to Open VSX
#[derive(Parser, Debug)]
#[command(name = "vsxpub")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the extension catalogue (JSON or YAML)
    #[arg(
        short,
        long,
        global = true,
        env = "VSXPUB_CATALOGUE",
        default_value = DEFAULT_CATALOGUE_FILE
    )]
    pub catalogue: Utf8PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the selected extensions and publish them
    Run(RunArgs),

    /// Show how each selected extension would be built
    Plan(PlanArgs),

    /// Check the catalogue for problems
    Validate(ValidateArgs),
}

// Run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Extension ids to process (default: the whole catalogue)
    pub extensions: Vec<String>,

    /// Registry base URL
    #[arg(long, env = "OVSX_REGISTRY_URL", default_value = DEFAULT_REGISTRY_URL)]
    pub registry_url: String,

    /// Registry access token
    #[arg(long, env = "OVSX_PAT", hide_env_values = true, hide = true)]
    pub token: Option<String>,

    /// Build and validate without publishing
    #[arg(long, env = "SKIP_PUBLISH")]
    pub skip_publish: bool,

    /// Publish even when the registry already has the built version
    #[arg(long, env = "FORCE")]
    pub force: bool,

    /// Require every dependency to be on the registry
    #[arg(long, env = "FORCE_DEPENDENCY_CHECK")]
    pub strict_dependencies: bool,

    /// Directory collecting finalized artifacts (emptied at the start of a run)
    #[arg(long, env = "VSXPUB_ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: Utf8PathBuf,

    /// Scratch directory for checkouts and downloads
    #[arg(long, env = "VSXPUB_WORK_DIR")]
    pub work_dir: Option<Utf8PathBuf>,

    /// Command confirming a license when no manifest declares one
    #[arg(long, env = "VSXPUB_LICENSE_CHECK")]
    pub license_check: Option<String>,

    /// Additional dependencies that only their author can publish
    #[arg(long = "unpublishable", value_name = "ID")]
    pub unpublishable: Vec<String>,
}

impl RunArgs {
    /// Assemble run settings from flags and environment
    pub fn settings(&self) -> Settings {
        let mut settings = Settings {
            registry_url: self.registry_url.clone(),
            token: self.token.clone(),
            skip_publish: self.skip_publish,
            force: self.force,
            strict_dependencies: self.strict_dependencies,
            artifacts_dir: self.artifacts_dir.clone().into_std_path_buf(),
            license_check: self.license_check.clone(),
            ..Default::default()
        };

        if let Some(work_dir) = &self.work_dir {
            settings.work_dir = work_dir.clone().into_std_path_buf();
        }
        settings
            .unpublishable
            .extend(self.unpublishable.iter().map(|id| id.to_ascii_lowercase()));

        settings
    }
}

// Plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Extension ids to show (default: the whole catalogue)
    pub extensions: Vec<String>,
}

// Validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flags_become_settings() {
        let cli = Cli::parse_from([
            "vsxpub",
            "run",
            "--skip-publish",
            "--force",
            "--artifacts-dir",
            "out",
            "--work-dir",
            "/tmp/scratch",
            "--unpublishable",
            "Acme.Private",
            "redhat.java",
        ]);

        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        let settings = args.settings();

        assert_eq!(args.extensions, vec!["redhat.java"]);
        assert!(settings.skip_publish);
        assert!(settings.force);
        assert!(!settings.strict_dependencies);
        assert_eq!(settings.artifacts_dir, std::path::PathBuf::from("out"));
        assert_eq!(settings.work_dir, std::path::PathBuf::from("/tmp/scratch"));
        assert!(settings.is_unpublishable("acme.private"));
        assert!(settings.is_unpublishable("ms-vscode.cpptools"));
    }

    #[test]
    fn test_catalogue_is_global() {
        let cli = Cli::parse_from(["vsxpub", "validate", "--catalogue", "extensions.yaml"]);
        assert_eq!(cli.catalogue, Utf8PathBuf::from("extensions.yaml"));
    }
}
