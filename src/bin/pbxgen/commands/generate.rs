//! `pbxgen generate` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::GenerateArgs;
use crate::GlobalOptions;
use pbxgen::ops::{generate, GenerateOptions};
use pbxgen::util::{Shell, Status};

pub fn execute(args: GenerateArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = Shell::from_flags(global_opts.no_color, args.json);

    let opts = GenerateOptions {
        root: args.path.unwrap_or_else(|| PathBuf::from(".")),
        name: args.name,
        source_root: args.source_root,
        sources: (!args.sources.is_empty()).then_some(args.sources),
        copy_from: args.copy_from,
        config: None,
    };

    let result = generate(&opts)?;

    shell.json(&serde_json::json!({
        "name": result.name,
        "manifest": result.manifest_path,
        "files": result.files,
        "objects": {
            "build_files": result.stats.build_files,
            "file_references": result.stats.file_references,
            "groups": result.stats.groups,
            "configurations": result.stats.configurations,
            "configuration_lists": result.stats.configuration_lists,
        },
    }))?;

    shell.status(
        Status::Created,
        format!(
            "{} ({} source file(s)) at {}",
            result.name,
            result.files,
            result.manifest_path.display()
        ),
    );
    if global_opts.verbose {
        shell.status(
            Status::Info,
            format!(
                "{} group(s), {} file reference(s), {} build configuration(s)",
                result.stats.groups, result.stats.file_references, result.stats.configurations
            ),
        );
    }

    Ok(())
}
