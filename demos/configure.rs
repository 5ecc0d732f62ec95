//! Example configuration program for a small C project.
//!
//! Build it, copy the binary to the project root as `configure`, then run it
//! from there to produce `build.ninja`. Set `NINJU_DEBUG` for a statement dump.

use std::process::ExitCode;

use miette::Result;
use ninju::{BuildArgs, BuildRuleOptions, ExecArgs, ExecRuleOptions, Session, SessionConfig};
use ninju::{Outputs, PoolRequest, TargetRef, files};
use tracing::Level;
use tracing_subscriber::fmt;

fn configure() -> Result<()> {
    let mut session = Session::new_or_exit(SessionConfig::from_current_exe()?)?;

    session.build_rule(
        "cc",
        "cc",
        BuildRuleOptions {
            description: Some("CC $out".into()),
            depfile: Some("$out.d".into()),
            deps: Some("gcc".into()),
            output_extension: Some("o".into()),
            ..BuildRuleOptions::args("-MMD -MF $out.d -c $in -o $out")
        },
    )?;
    session.build_rule(
        "link",
        "cc",
        BuildRuleOptions {
            description: Some("LINK $out".into()),
            pool: PoolRequest::Depth(1),
            ..BuildRuleOptions::args("$in -o $out")
        },
    )?;
    session.exec_rule(
        "run",
        "sh",
        ExecRuleOptions {
            args: Some("-c ./$in".into()),
            ..ExecRuleOptions::default()
        },
    )?;

    let src = session.dir(&["src"], Some("src"))?;
    let sources = files![src.file(&["main.c"]), src.file(&["util.c"])];
    let app = sources
        .then(&mut session, "cc", BuildArgs::to(Outputs::Count(sources.len())))?
        .then(&mut session, "link", BuildArgs::to("app"))?;
    TargetRef::new("run").exec(&mut session, "run", ExecArgs::inputs(&app))?;
    TargetRef::new("all").phony(&mut session, &app)?;
    session.default("all")?;

    session.generate()?;
    Ok(())
}

fn main() -> ExitCode {
    let max_level = if std::env::var_os("NINJU_DEBUG").is_some() {
        Level::DEBUG
    } else {
        Level::INFO
    };
    fmt().with_max_level(max_level).init();
    match configure() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = ?err, "configuration failed");
            ExitCode::FAILURE
        }
    }
}
