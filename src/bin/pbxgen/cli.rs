//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// pbxgen - generate and patch Xcode project.pbxproj manifests
#[derive(Parser)]
#[command(name = "pbxgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a project from the sources under the project root
    Generate(GenerateArgs),

    /// Add source files to an existing project
    Add(AddArgs),

    /// Verify the cross-references of a manifest
    Check(CheckArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Project root (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Project and target name (defaults to the directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Directory holding the sources, relative to the project root
    #[arg(long)]
    pub source_root: Option<String>,

    /// Source file relative to the source root (repeatable; discovered if omitted)
    #[arg(long = "source", value_name = "PATH")]
    pub sources: Vec<String>,

    /// Copy this directory into the source root before generating
    #[arg(long, value_name = "DIR")]
    pub copy_from: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Source files relative to the source root
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Manifest, .xcodeproj bundle, or directory containing one
    #[arg(short, long, default_value = ".")]
    pub project: PathBuf,

    /// `path` of the group to add to (defaults to the configured source root)
    #[arg(long)]
    pub source_root: Option<String>,

    /// Add files even if their path is already in the project
    #[arg(long)]
    pub allow_duplicates: bool,

    /// Fail if any anchor could not be found
    #[arg(long)]
    pub strict: bool,

    /// Print the patch report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Manifest, .xcodeproj bundle, or directory containing one
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Print the findings as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "pbxgen",
            "add",
            "Store.swift",
            "Views/Detail.swift",
            "--project",
            "App.xcodeproj",
            "--allow-duplicates",
        ])
        .unwrap();
        let Commands::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.files, vec!["Store.swift", "Views/Detail.swift"]);
        assert_eq!(args.project, PathBuf::from("App.xcodeproj"));
        assert!(args.allow_duplicates);
        assert!(!args.strict);
    }

    #[test]
    fn test_add_requires_files() {
        assert!(Cli::try_parse_from(["pbxgen", "add"]).is_err());
    }

    #[test]
    fn test_parse_generate_sources() {
        let cli = Cli::try_parse_from([
            "pbxgen",
            "--verbose",
            "generate",
            "MyApp",
            "--source",
            "A.swift",
            "--source",
            "sub/B.swift",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.path, Some(PathBuf::from("MyApp")));
        assert_eq!(args.sources, vec!["A.swift", "sub/B.swift"]);
    }
}
