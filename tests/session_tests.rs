//! End-to-end configuration scenarios through the public API.

use anyhow::Result;
use ninju::{
    BuildArgs, BuildRuleOptions, ErrorKind, ExecArgs, ExecRuleOptions, Outputs, PathLookup,
    PoolRequest, Session, SessionConfig, TargetRef, files,
};
use rstest::{fixture, rstest};
use test_support::{StaticResolver, TempProject, tool_dir};

#[fixture]
fn project() -> TempProject {
    TempProject::new().expect("temp project")
}

fn session_in(project: &TempProject) -> Session {
    let resolver = StaticResolver::usr_bin(&["cc", "rsync"]);
    Session::with_resolver(project.config(), resolver).expect("bootstrap session")
}

fn body(session: &Session) -> String {
    let marker = "rule cc\n";
    let text = session.render();
    let (_, rest) = text.split_once(marker).expect("user rules follow the preamble");
    format!("{marker}{rest}")
}

#[rstest]
fn c_program_pipeline(project: TempProject) -> Result<()> {
    let mut session = session_in(&project);
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
    session.build_rule("link", "cc", BuildRuleOptions::args("$in -o $out"))?;
    session.exec_rule(
        "deploy",
        "rsync",
        ExecRuleOptions {
            args: Some("$in host:/srv".into()),
            ..ExecRuleOptions::default()
        },
    )?;

    let app = files!["main.c", "util.c"]
        .then(&mut session, "cc", BuildArgs::to(Outputs::Count(2)))?
        .then(&mut session, "link", BuildArgs::to("app"))?;
    let deploy = TargetRef::new("deploy").exec(&mut session, "deploy", ExecArgs::inputs(&app))?;
    TargetRef::new("all").phony(&mut session, &app)?;
    session.default(&deploy)?;

    let expected = concat!(
        "rule cc\n",
        "  command = /usr/bin/cc -MMD -MF $out.d -c $in -o $out\n",
        "  description = CC $out\n",
        "  depfile = $out.d\n",
        "  deps = gcc\n\n",
        "rule link\n",
        "  command = /usr/bin/cc $in -o $out\n\n",
        "rule deploy\n",
        "  command = /usr/bin/rsync $in host:/srv\n",
        "  pool = console\n\n",
        "build ${builddir}/.ninju_1.o ${builddir}/.ninju_2.o: cc main.c util.c | /usr/bin/cc\n\n",
        "build app: link ${builddir}/.ninju_1.o ${builddir}/.ninju_2.o | /usr/bin/cc\n\n",
        "build deploy: deploy app\n\n",
        "build all: phony app\n\n",
        "default deploy\n\n",
    );
    assert_eq!(body(&session), expected);
    assert!(session.diagnostics().is_empty());
    Ok(())
}

#[rstest]
fn generated_names_are_unique_across_rules(project: TempProject) -> Result<()> {
    let mut session = session_in(&project);
    session.build_rule("a", "cc", BuildRuleOptions::default())?;
    session.build_rule(
        "b",
        "cc",
        BuildRuleOptions {
            output_extension: Some("bin".into()),
            ..BuildRuleOptions::default()
        },
    )?;
    let first = files!["x"].then(&mut session, "a", BuildArgs::to(Outputs::Count(2)))?;
    let second = files!["y"].then(&mut session, "b", BuildArgs::default())?;
    assert_eq!(
        first.tokens(),
        ["${builddir}/.ninju_1.tmp", "${builddir}/.ninju_2.tmp"]
    );
    assert_eq!(second.tokens(), ["${builddir}/.ninju_3.bin"]);
    Ok(())
}

#[rstest]
#[case(PoolRequest::Depth(0))]
#[case(PoolRequest::Depth(-3))]
#[case(PoolRequest::Named("link_pool".into()))]
fn invalid_pool_requests(project: TempProject, #[case] request: PoolRequest) {
    let mut session = session_in(&project);
    let err = session.pool(request).expect_err("invalid pool");
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[rstest]
fn console_and_default_pools(project: TempProject) -> Result<()> {
    let mut session = session_in(&project);
    assert_eq!(session.pool(PoolRequest::None)?, None);
    assert_eq!(session.pool("console")?.as_deref(), Some("console"));
    assert!(!session.render().contains("pool console"));
    Ok(())
}

#[rstest]
fn regeneration_edge_lists_extra_inputs(project: TempProject) -> Result<()> {
    let config = SessionConfig {
        extra_implicit: vec!["configure.toml".into()],
        ..project.config()
    };
    let session = Session::with_resolver(config, StaticResolver::default())?;
    let text = session.render();
    let edge = text
        .lines()
        .find(|line| line.starts_with("build ${root}/build.ninja: configure"))
        .expect("regeneration edge");
    assert!(edge.ends_with(" configure.toml"));
    assert_eq!(
        session.diagnostics().missing_executables().collect::<Vec<_>>(),
        [project.script().as_str()]
    );
    Ok(())
}

#[rstest]
fn generate_writes_build_file(project: TempProject) -> Result<()> {
    let mut session = session_in(&project);
    session.build_rule("cc", "cc", BuildRuleOptions::args("-c $in -o $out"))?;
    files!["main.c"].then(&mut session, "cc", BuildArgs::to("main.o"))?;
    let path = session.generate()?;
    assert_eq!(path, project.root().join("build.ninja"));
    assert_eq!(project.read("build.ninja")?, session.render());
    Ok(())
}

#[rstest]
fn path_lookup_finds_fake_tools(project: TempProject) -> Result<()> {
    let (_guard, bin) = tool_dir(&["cc"])?;
    let lookup = PathLookup::new(project.root().to_owned(), Some(bin.as_os_str().to_owned()));
    let mut session = Session::with_resolver(project.config(), lookup)?;
    let cc = session.build_rule("cc", "cc", BuildRuleOptions::default())?;
    assert_eq!(cc.executable_path(), bin.join("cc").as_str());
    session.build_rule("ld", "ld-not-installed", BuildRuleOptions::default())?;
    let missing: Vec<_> = session.diagnostics().missing_executables().collect();
    assert!(missing.contains(&"ld-not-installed"));
    Ok(())
}

#[rstest]
fn config_parses_from_json() -> Result<()> {
    let config: SessionConfig = serde_json::from_str(
        r#"{ "script": "/p/configure", "build_dir": "out", "blank_lines": false }"#,
    )?;
    assert_eq!(config.build_dir, "out");
    assert_eq!(config.build_file, "build.ninja");
    assert!(!config.blank_lines);
    assert!(serde_json::from_str::<SessionConfig>(r#"{ "nope": 1 }"#).is_err());
    Ok(())
}
