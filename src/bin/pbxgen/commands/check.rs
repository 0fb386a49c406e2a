//! `pbxgen check` command

use anyhow::{bail, Result};

use crate::cli::CheckArgs;
use crate::GlobalOptions;
use pbxgen::codec::ParseError;
use pbxgen::ops::{check, find_manifest};
use pbxgen::util::diagnostic::Severity;
use pbxgen::util::{Shell, Status};

pub fn execute(args: CheckArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = Shell::from_flags(global_opts.no_color, args.json);
    let manifest = find_manifest(&args.path)?;

    let report = match check(&manifest) {
        Ok(report) => report,
        Err(err) => match err.downcast::<ParseError>() {
            Ok(parse) => {
                eprintln!("{:?}", miette::Report::new(parse));
                bail!("{} is not a valid manifest", manifest.display());
            }
            Err(err) => return Err(err),
        },
    };

    let diagnostics: Vec<_> = report
        .diagnostics
        .iter()
        .map(|d| {
            serde_json::json!({
                "severity": match d.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                    Severity::Note => "note",
                },
                "message": d.message,
            })
        })
        .collect();
    shell.json(&serde_json::json!({
        "manifest": report.manifest_path,
        "objects": report.objects(),
        "counts": report.counts,
        "errors": report.errors(),
        "diagnostics": diagnostics,
    }))?;

    for diagnostic in &report.diagnostics {
        shell.diagnostic(diagnostic);
    }

    if !report.is_ok() {
        bail!(
            "{} has {} error(s)",
            manifest.display(),
            report.errors()
        );
    }

    shell.status(
        Status::Checked,
        format!("{} ({} objects)", manifest.display(), report.objects()),
    );
    Ok(())
}
