//! `pbxgen add` command

use anyhow::{bail, Result};

use crate::cli::AddArgs;
use crate::GlobalOptions;
use pbxgen::ops::{add_files, find_manifest, AddOptions};
use pbxgen::util::{Shell, Status};

pub fn execute(args: AddArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = Shell::from_flags(global_opts.no_color, args.json);

    let manifest = find_manifest(&args.project)?;
    let opts = AddOptions {
        manifest,
        files: args.files,
        source_root: args.source_root,
        allow_duplicates: args.allow_duplicates,
    };

    let result = add_files(&opts)?;
    let report = &result.report;

    shell.json(&serde_json::json!({
        "manifest": result.manifest_path,
        "source_root": result.source_root,
        "written": result.written,
        "report": report,
    }))?;

    for added in &report.added {
        shell.status(Status::Added, &added.path);
    }
    for path in &report.skipped {
        shell.status(Status::Skipped, format!("{} (already in the project)", path));
    }
    for diagnostic in report.diagnostics() {
        shell.diagnostic(&diagnostic.with_location(&result.manifest_path));
    }
    if !result.written {
        shell.status(Status::Info, "nothing to add");
    }

    let missing = report.missing();
    if args.strict && !missing.is_empty() {
        bail!(
            "{} anchor(s) not found in {}",
            missing.len(),
            result.manifest_path.display()
        );
    }

    Ok(())
}
