use declflags::{Action, Args};
use expect_test::expect;

use crate::{args, check, usage_error};

/// Typed fields without declarations.
#[derive(Debug, Args)]
pub struct Basic {
    #[arg(default = None::<i64>)]
    optional_int_with_default: Option<i64>,
    optional_int_without_default: Option<i64>,
    /// float_with_default
    #[arg(default = 0.0)]
    float_with_default: f64,
    float_without_default: f64,
    /// list_of_ints_without_default
    list_of_ints_without_default: Vec<i64>,
    /// This is not the help text
    #[arg("--some-argument", action = Action::StoreTrue, help = "some_argument")]
    some_argument: bool,
}

#[derive(Debug, Args)]
pub struct Booleans {
    bool_without_default: bool,
    #[arg(default = None::<bool>)]
    optional_bool_with_default: Option<bool>,
    optional_bool_without_default: Option<bool>,
    #[arg(default = false)]
    bool_with_default_false: bool,
    #[arg(default = true)]
    bool_with_default_true: bool,
}

#[derive(Debug, Args)]
pub struct TupleAndLists {
    tuple_of_ints: (i64, i64),
    list_of_ints_without_default: Vec<i64>,
}

#[derive(Debug, Args)]
pub struct Containers {
    #[arg(default = vec![1, 2, 3])]
    list_of_ints_with_default: Vec<i64>,
    #[arg(default = None::<i64>)]
    optional_list_of_ints_with_default: Option<Vec<i64>>,
    optional_list_of_ints_without_default: Option<Vec<i64>>,
}

#[allow(non_snake_case)]
#[derive(Debug, Args)]
pub struct Positional {
    flag: i64,
    POSITIONAL: i64,
    AnotherFlag: i64,
}

#[test]
fn basic() {
    check(
        Basic::from_vec,
        "--float-without-default 3.14 --list-of-ints-without-default 1 2 3",
        expect![[r#"
            Basic {
                optional_int_with_default: None,
                optional_int_without_default: None,
                float_with_default: 0.0,
                float_without_default: 3.14,
                list_of_ints_without_default: [
                    1,
                    2,
                    3,
                ],
                some_argument: false,
            }
        "#]],
    );
    check(
        Basic::from_vec,
        "--optional-int-with-default 3 --optional-int-without-default 4 \
         --float-without-default 3.14 --list-of-ints-without-default 1 --some-argument",
        expect![[r#"
            Basic {
                optional_int_with_default: Some(
                    3,
                ),
                optional_int_without_default: Some(
                    4,
                ),
                float_with_default: 0.0,
                float_without_default: 3.14,
                list_of_ints_without_default: [
                    1,
                ],
                some_argument: true,
            }
        "#]],
    );
}

#[test]
fn docs_become_help() {
    let program = Basic::program().unwrap();
    let registry = program.root().registry();
    let help = |attr: &str| registry.entry(attr).unwrap().decl.help.clone();
    assert_eq!(help("float_with_default").as_deref(), Some("float_with_default"));
    assert_eq!(
        help("list_of_ints_without_default").as_deref(),
        Some("list_of_ints_without_default")
    );
    assert_eq!(help("some_argument").as_deref(), Some("some_argument"));
    assert_eq!(help("float_without_default"), None);
}

#[test]
fn booleans() {
    let err = usage_error(Booleans::from_vec(args("")));
    assert!(err.contains("--bool-without-default"), "{err}");

    check(
        Booleans::from_vec,
        "--bool-without-default False",
        expect![[r#"
            Booleans {
                bool_without_default: false,
                optional_bool_with_default: None,
                optional_bool_without_default: None,
                bool_with_default_false: false,
                bool_with_default_true: true,
            }
        "#]],
    );
    check(
        Booleans::from_vec,
        "--bool-without-default yes --bool-with-default-true --bool-with-default-false",
        expect![[r#"
            Booleans {
                bool_without_default: true,
                optional_bool_with_default: None,
                optional_bool_without_default: None,
                bool_with_default_false: true,
                bool_with_default_true: false,
            }
        "#]],
    );

    let err = usage_error(Booleans::from_vec(args("--bool-without-default not-a-bool")));
    assert!(err.contains("not-a-bool"), "{err}");
}

#[test]
fn tuples_and_lists() {
    usage_error(TupleAndLists::from_vec(args("")));
    usage_error(TupleAndLists::from_vec(args("--tuple-of-ints 1")));
    usage_error(TupleAndLists::from_vec(args("--list-of-ints 1 2")));

    check(
        TupleAndLists::from_vec,
        "--tuple-of-ints 1 2 --list-of-ints 3",
        expect![[r#"
            TupleAndLists {
                tuple_of_ints: (
                    1,
                    2,
                ),
                list_of_ints_without_default: [
                    3,
                ],
            }
        "#]],
    );
    check(
        TupleAndLists::from_vec,
        "--tuple-of-ints 1 -2 --list-of-ints",
        expect![[r#"
            TupleAndLists {
                tuple_of_ints: (
                    1,
                    -2,
                ),
                list_of_ints_without_default: [],
            }
        "#]],
    );
}

#[test]
fn container_defaults() {
    check(
        Containers::from_vec,
        "",
        expect![[r#"
            Containers {
                list_of_ints_with_default: [
                    1,
                    2,
                    3,
                ],
                optional_list_of_ints_with_default: None,
                optional_list_of_ints_without_default: None,
            }
        "#]],
    );
    check(
        Containers::from_vec,
        "--list-of-ints-with-default 4 5 --optional-list-of-ints-with-default 6 \
         --optional-list-of-ints-without-default 7 8",
        expect![[r#"
            Containers {
                list_of_ints_with_default: [
                    4,
                    5,
                ],
                optional_list_of_ints_with_default: Some(
                    [
                        6,
                    ],
                ),
                optional_list_of_ints_without_default: Some(
                    [
                        7,
                        8,
                    ],
                ),
            }
        "#]],
    );
}

#[test]
fn positional_by_case() {
    check(
        Positional::from_vec,
        "2 --flag 1 --anotherflag 3",
        expect![[r#"
            Positional {
                flag: 1,
                POSITIONAL: 2,
                AnotherFlag: 3,
            }
        "#]],
    );
}
