use declflags::{
    Action, ArgumentDeclaration, Class, Coercer, Error, Field, Nargs, Program, Settings,
    SubcommandDeclaration, Ty, Value,
};
use expect_test::expect;

use crate::{args, check};

fn ranges() -> Program {
    let class = Class::new("Plot")
        .arg("range", ArgumentDeclaration::new(["--range"]), Ty::of::<(i64, i64)>())
        .arg(
            "scale",
            ArgumentDeclaration::new(["--scale"]).default(1.5).metavar("FACTOR"),
            Ty::Float,
        )
        .arg(
            "points",
            ArgumentDeclaration::new(["--points"]).nargs(Nargs::OneOrMore),
            Ty::tuple_open(Ty::Int),
        )
        .arg(
            "hex",
            ArgumentDeclaration::new(["--hex"]).coercer(Coercer::custom("hex", |raw: &str| {
                i64::from_str_radix(raw.trim_start_matches("0x"), 16)
                    .map(Value::Int)
                    .map_err(|err| err.to_string())
            })),
            Ty::Int,
        );
    Program::new(class).unwrap()
}

#[test]
fn fixed_tuple_arity() {
    check(
        &ranges(),
        "--range 1 2",
        expect![[r#"
            Plot range=(1, 2) scale=1.5
        "#]],
    );
    let err = ranges().from_vec(args("--range 1")).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    let err = ranges().from_vec(args("--range 1 2 3")).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn open_tuple_and_custom_coercer() {
    check(
        &ranges(),
        "--points 4 --hex 0xff --scale 2",
        expect![[r#"
            Plot scale=2 points=(4) hex=255
        "#]],
    );
}

#[test]
fn explicit_default_round_trips_unchanged() {
    let class = Class::new("Cli")
        .arg("level", ArgumentDeclaration::new(["--level"]).default("3"), Ty::Int)
        .arg("names", ArgumentDeclaration::new(["--names"]).default("solo"), Ty::list(Ty::Str))
        .field(Field::new("ratio", Ty::Float).default(0.25));
    let loaded = Program::new(class).unwrap().from_vec(Vec::new()).unwrap();
    let root = loaded.root().bound();
    assert_eq!(root.value("level"), Some(&Value::from("3")));
    assert_eq!(root.value("names"), Some(&Value::from("solo")));
    assert_eq!(root.get::<f64>("ratio").unwrap(), 0.25);
}

#[test]
fn list_shapes() {
    let class = Class::new("Cli")
        .arg("one", ArgumentDeclaration::new(["--one"]), Ty::list(Ty::Int))
        .field(Field::new("many", Ty::list(Ty::Int)).default(Vec::<i64>::new()))
        .arg(
            "ext",
            ArgumentDeclaration::new(["--ext"]).action(Action::Extend).nargs(Nargs::OneOrMore),
            Ty::list(Ty::Str),
        )
        .arg(
            "marks",
            ArgumentDeclaration::new(["-m"]).action(Action::AppendConst).constant("m"),
            Ty::list(Ty::Str),
        );
    let program = Program::new(class).unwrap();
    check(
        &program,
        "--one 7 --many --ext a b --ext c -m -m",
        expect![[r#"
            Cli one=[7] many=[] ext=[a, b, c] marks=[m, m]
        "#]],
    );
}

#[test]
fn explicit_choices_override_literal_choices() {
    let class = Class::new("Cli").arg(
        "mode",
        ArgumentDeclaration::new(["--mode"]).choices(["fast"]),
        Ty::literal(["fast", "slow"]),
    );
    let program = Program::new(class).unwrap();
    assert!(program.from_vec(args("--mode fast")).is_ok());
    assert!(program.from_vec(args("--mode slow")).is_err());
}

#[test]
fn unresolved_types_degrade_one_field() {
    let class = Class::new("Cli")
        .arg("level", ArgumentDeclaration::new(["--level"]), Ty::named("Level"))
        .arg("count", ArgumentDeclaration::new(["--count"]), Ty::Int);
    let program = Program::new(class).unwrap();
    check(
        &program,
        "--level 5 --count 5",
        expect![[r#"
            Cli level=5 count=5
        "#]],
    );
    let root = program.from_vec(args("--level 5 --count 5")).unwrap().root().bound().clone();
    assert_eq!(root.value("level"), Some(&Value::from("5")));
    assert_eq!(root.value("count"), Some(&Value::Int(5)));
}

#[test]
fn subcommand_scenario() {
    let build = Class::new("Build").arg("target", ArgumentDeclaration::new(["--target"]), Ty::Str);
    let test = Class::new("Test").field(Field::new("jobs", Ty::Int).default(1));
    let deploy = Class::new("Deploy")
        .subcommand(SubcommandDeclaration::new("push", Class::new("Push")));
    let root = Class::new("Cli")
        .arg("name", ArgumentDeclaration::new(["--name"]).default("cli"), Ty::Str)
        .subcommand(SubcommandDeclaration::new("build", build).help("Build it"))
        .subcommand(SubcommandDeclaration::new("test", test))
        .subcommand(SubcommandDeclaration::new("deploy", deploy));
    let program = Program::new(root).unwrap();

    check(
        &program,
        "build --target x",
        expect![[r#"
            Cli name=cli
            Build (build) target=x
        "#]],
    );
    check(
        &program,
        "deploy push",
        expect![[r#"
            Cli name=cli
            Deploy (deploy)
            Push (push)
        "#]],
    );

    let loaded = program.from_vec(args("deploy push")).unwrap();
    assert_eq!(loaded.find("Push").and_then(|it| it.command()), Some("push"));
    assert_eq!(loaded.find("Cli").map(|it| it.class()), Some("Cli"));
    assert!(loaded.find("Build").is_none());

    let err = program.from_vec(args("deploy")).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn keys_named_like_builtin_flags() {
    let class = Class::new("Cli")
        .arg("help", ArgumentDeclaration::new(["--show-help"]).action(Action::StoreTrue), Ty::Bool)
        .arg("version", ArgumentDeclaration::new(["--build-version"]), Ty::Str);
    let program = Program::new(class).unwrap().version("1.0");
    program.command().debug_assert();

    check(
        &program,
        "--show-help --build-version 7",
        expect![[r#"
            Cli help=true version=7
        "#]],
    );
    assert!(program.from_vec(args("--help")).unwrap_err().is_help());
    let err = program.from_vec(args("--version")).unwrap_err();
    assert!(err.to_string().contains("1.0"), "{err}");
}

#[test]
fn appending_actions_extend_list_defaults() {
    let class = Class::new("Cli")
        .arg(
            "tags",
            ArgumentDeclaration::new(["--tag"]).action(Action::Append).default(vec!["base"]),
            Ty::list(Ty::Str),
        )
        .arg(
            "more",
            ArgumentDeclaration::new(["--more"])
                .action(Action::Extend)
                .nargs(Nargs::OneOrMore)
                .default(vec!["x"]),
            Ty::list(Ty::Str),
        )
        .arg(
            "marks",
            ArgumentDeclaration::new(["--mark"])
                .action(Action::AppendConst)
                .constant("m")
                .default(vec!["start"]),
            Ty::list(Ty::Str),
        );
    let program = Program::new(class).unwrap();

    check(
        &program,
        "",
        expect![[r#"
            Cli tags=[base] more=[x] marks=[start]
        "#]],
    );
    check(
        &program,
        "--tag extra --more y z --mark --mark",
        expect![[r#"
            Cli tags=[base, extra] more=[x, y, z] marks=[start, m, m]
        "#]],
    );
}

#[test]
fn structural_errors() {
    let root = Class::new("Cli").arg("v", ArgumentDeclaration::new(["-verbose"]), Ty::Bool);
    assert!(matches!(Program::new(root), Err(Error::Declaration { .. })));

    let shared = Class::new("Shared");
    let nested = Class::new("B").subcommand(SubcommandDeclaration::new("c", shared.clone()));
    let root = Class::new("Cli")
        .subcommand(SubcommandDeclaration::new("a", shared))
        .subcommand(SubcommandDeclaration::new("b", nested));
    let err = Program::new(root).unwrap_err();
    assert_eq!(
        err.to_string(),
        "class `Shared` is attached as `B.c` but already attached as `Cli.a`"
    );
}

#[test]
fn settings() {
    let class =
        Class::new("Cli").arg("long_name", ArgumentDeclaration::new(["--long-name"]), Ty::Str);
    let program = Program::new(class)
        .unwrap()
        .with_settings(Settings { name: Some("tool".to_string()), ..Settings::default() })
        .version("0.1.0");
    assert_eq!(program.command().get_name(), "tool");

    let err = program.from_vec(args("--version")).unwrap_err();
    assert!(err.is_help());
    assert!(err.to_string().contains("tool 0.1.0"));

    assert!(program.from_vec(args("--long x")).is_ok());
    let strict = program.clone().allow_abbrev(false);
    assert!(strict.from_vec(args("--long x")).is_err());
}

#[test]
fn unset_reads_fail_fast() {
    let class = Class::new("Cli")
        .arg("opt", ArgumentDeclaration::new(["--opt"]).suppress(), Ty::Str)
        .arg("plain", ArgumentDeclaration::new(["--plain"]), Ty::Str);
    let loaded = Program::new(class).unwrap().from_vec(Vec::new()).unwrap();
    let root = loaded.root();
    assert!(matches!(root.get::<String>("opt"), Err(Error::Unset { .. })));
    assert!(matches!(root.get::<String>("plain"), Err(Error::Unset { .. })));
    assert_eq!(root.get::<Option<String>>("plain").unwrap(), None);
    assert!(matches!(root.get::<String>("missing"), Err(Error::UnknownField { .. })));
}
