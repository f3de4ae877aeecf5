mod files;
mod scenarios;

use std::ffi::OsString;

use declflags::{Loaded, Program};
use expect_test::Expect;

fn args(args: &str) -> Vec<OsString> {
    args.split_ascii_whitespace().map(OsString::from).collect()
}

/// Renders every resolved instance, one per line.
fn check(program: &Program, args: &str, expect: Expect) {
    let loaded = program.from_vec(self::args(args)).unwrap();
    expect.assert_eq(&render(&loaded));
}

fn render(loaded: &Loaded) -> String {
    let mut res = format!("{}\n", loaded.root());
    for it in loaded.chain() {
        res.push_str(&format!("{it}\n"));
    }
    res
}
