use std::{fs, io::Read};

use declflags::{ArgumentDeclaration, Class, FileType, Handle, Program, Ty};

use crate::args;

fn program() -> Program {
    let class = Class::new("Copy")
        .arg("input", ArgumentDeclaration::new(["INPUT"]), Ty::File(FileType::new("r")))
        .arg(
            "output",
            ArgumentDeclaration::new(["-o", "--output"]),
            Ty::File(FileType::new("w").bufsize(0)),
        );
    Program::new(class).unwrap()
}

#[test]
fn files_are_opened_while_parsing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    let output = dir.path().join("out.txt");
    fs::write(&input, "hello\nworld\n").unwrap();

    let argv = format!("{} -o {}", input.display(), output.display());
    let loaded = program().from_vec(args(&argv)).unwrap();
    let root = loaded.root();

    let input: Handle = root.get("input").unwrap();
    let mut line = String::new();
    input.read_line(&mut line).unwrap();
    assert_eq!(line, "hello\n");
    assert_eq!(input.read_to_string().unwrap(), "world\n");

    let out: Handle = root.get("output").unwrap();
    assert_eq!(out.mode(), "w");
    out.write_str("copied").unwrap();
    out.flush().unwrap();

    let mut written = String::new();
    fs::File::open(&output).unwrap().read_to_string(&mut written).unwrap();
    assert_eq!(written, "copied");
}

#[test]
fn missing_input_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.txt");
    let err = program().from_vec(args(&missing.display().to_string())).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("can't open"), "{err}");
}
