use declflags::{Action, Args, Nargs, Ty};
use expect_test::expect;

use crate::{args, check, usage_error};

/// Runs a job.
#[derive(Debug, Args)]
#[args(name = "Job", alias("Color", Ty::literal(["red", "green"])))]
pub struct Job {
    /// Raise the log level
    #[arg("-v", "--verbose", action = Action::Count, default = 0)]
    verbose: i64,
    #[arg("--tag", action = Action::Append)]
    tags: Option<Vec<String>>,
    #[arg("--mode", choices = ["fast", "slow"], default = "fast")]
    mode: String,
    #[arg("--color", ty = Ty::named("Color"), default = "red")]
    color: String,
    #[arg("--fast", action = Action::StoreConst, constant = 10, default = 1, dest = "speed")]
    speed: i64,
    #[arg("--cache", suppress)]
    cache: Option<String>,
    #[arg("-V", "--version", action = Action::Version, version = "job 1.2.3")]
    version: Option<String>,
    #[arg("INPUTS", nargs = Nargs::ZeroOrMore, metavar = "INPUT")]
    inputs: Vec<std::path::PathBuf>,
}

#[derive(Debug, Args)]
pub struct Common {
    #[arg("--level", default = "info")]
    level: String,
    #[arg("--dry-run", action = Action::StoreTrue)]
    dry_run: bool,
}

#[derive(Debug, Args)]
pub struct Deploy {
    #[arg(base)]
    common: Common,
    #[arg("-l", "--log-level", default = "warn")]
    level: String,
    #[arg("TARGET")]
    target: String,
}

#[derive(Debug, Args)]
pub struct Empty;

#[test]
fn empty() {
    check(
        Empty::from_vec,
        "",
        expect![[r#"
            Empty
        "#]],
    );
    usage_error(Empty::from_vec(args("extra")));
}

#[test]
fn actions() {
    check(
        Job::from_vec,
        "",
        expect![[r#"
            Job {
                verbose: 0,
                tags: None,
                mode: "fast",
                color: "red",
                speed: 1,
                cache: None,
                version: None,
                inputs: [],
            }
        "#]],
    );
    check(
        Job::from_vec,
        "-vv --verbose --tag a --tag b --mode slow --color green --fast --cache dir x.txt y.txt",
        expect![[r#"
            Job {
                verbose: 3,
                tags: Some(
                    [
                        "a",
                        "b",
                    ],
                ),
                mode: "slow",
                color: "green",
                speed: 10,
                cache: Some(
                    "dir",
                ),
                version: None,
                inputs: [
                    "x.txt",
                    "y.txt",
                ],
            }
        "#]],
    );
}

#[test]
fn suppressed_keys_are_left_out() {
    let loaded = Job::program().unwrap().from_vec(args("")).unwrap();
    assert!(!loaded.root().bound().is_set("cache"));
    assert!(loaded.root().bound().is_set("speed"));
}

#[test]
fn restricted_choices() {
    let err = usage_error(Job::from_vec(args("--mode medium")));
    assert!(err.contains("invalid choice: 'medium' (choose from 'fast', 'slow')"), "{err}");

    let err = usage_error(Job::from_vec(args("--color blue")));
    assert!(err.contains("invalid choice: 'blue' (choose from 'red', 'green')"), "{err}");
}

#[test]
fn help_and_version_exit_successfully() {
    let err = Job::from_vec(args("--help")).unwrap_err();
    assert!(err.is_help());
    assert_eq!(err.exit_code(), 0);
    let help = err.to_string();
    assert!(help.contains("Runs a job."), "{help}");
    assert!(help.contains("Raise the log level"), "{help}");
    assert!(help.contains("[INPUT]..."), "{help}");

    let err = Job::from_vec(args("-V")).unwrap_err();
    assert!(err.is_help());
    assert_eq!(err.exit_code(), 0);
    assert!(err.to_string().contains("job 1.2.3"));
}

#[test]
fn inherited_declarations_can_be_replaced() {
    check(
        Deploy::from_vec,
        "-l debug --dry-run prod",
        expect![[r#"
            Deploy {
                common: Common {
                    level: "debug",
                    dry_run: true,
                },
                level: "debug",
                target: "prod",
            }
        "#]],
    );

    let err = usage_error(Deploy::from_vec(args("--level debug prod")));
    assert!(err.contains("--level"), "{err}");
}

#[test]
fn abbreviations() {
    check(
        Deploy::from_vec,
        "--log debug --dry prod",
        expect![[r#"
            Deploy {
                common: Common {
                    level: "debug",
                    dry_run: true,
                },
                level: "debug",
                target: "prod",
            }
        "#]],
    );

    let program = Deploy::program().unwrap().allow_abbrev(false);
    usage_error(program.from_vec(args("--log debug prod")));
}
