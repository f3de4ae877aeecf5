//! Declarative command line arguments.
//!
//! A class declares its fields: explicit [`ArgumentDeclaration`]s, plain
//! typed [`Field`]s whose flags are derived from the name and the type, and
//! [`SubcommandDeclaration`]s pointing at other classes. A [`Program`]
//! compiles the class tree once; each load parses a token list with `clap`
//! and returns an immutable [`Loaded`] with one [`Bound`] per resolved class.
//!
//! ```no_run
//! use declflags::{ArgumentDeclaration, Class, Field, Program, Ty};
//!
//! let class = Class::new("Greet")
//!     .arg("name", ArgumentDeclaration::new(["-n", "--name"]).help("Who to greet"), Ty::Str)
//!     .field(Field::new("times", Ty::Int).default(1));
//! let loaded = Program::new(class)?.from_env_or_exit();
//! let name: String = loaded.root().get("name")?;
//! # Ok::<(), declflags::Error>(())
//! ```
//!
//! With the derive, the same class is a struct:
//!
//! ```no_run
//! /// Greets somebody.
//! #[derive(Debug, declflags::Args)]
//! struct Greet {
//!     /// Who to greet
//!     #[arg("-n", "--name")]
//!     name: String,
//!     #[arg(default = 1)]
//!     times: i64,
//! }
//!
//! let greet: Greet = declflags::Args::from_env_or_exit();
//! ```
mod bind;
mod build;
mod decl;
mod file;
mod registry;
mod specless;
mod tree;
mod ty;
mod value;

use std::ffi::OsString;

pub use crate::{
    bind::{bind, Bound, Instance, Loaded, Namespace, Origin},
    decl::{
        Action, ArgumentDeclaration, Class, DefaultValue, Field, Nargs, SubcommandDeclaration,
    },
    file::{FileType, Handle},
    registry::{Entry, Registry},
    tree::{binding_key, Node, Program, Settings, ROOT_KEY},
    ty::{infer, parse_bool, Coercer, Scope, Shape, Ty, TypeError},
    value::{FromValue, Typed, Value},
};

pub use declflags_macros::Args;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad command line input, or a help/version request.
    #[error(transparent)]
    Usage(#[from] clap::Error),
    #[error("invalid declaration of `{field}` in `{class}`: {reason}")]
    Declaration { class: String, field: String, reason: String },
    #[error("class `{class}` is attached as `{second}` but already attached as `{first}`")]
    Reattached { class: String, first: String, second: String },
    #[error("`{class}` declares no field `{field}`")]
    UnknownField { class: String, field: String },
    #[error("value of `{field}` in `{class}` is unset")]
    Unset { class: String, field: String },
    #[error("value of `{field}` is a {found}, expected `{expected}`")]
    Mismatch { field: String, expected: &'static str, found: &'static str },
    #[error("expected an instance of `{expected}`, got `{found}`")]
    WrongClass { expected: String, found: String },
}

impl Error {
    /// Prints the error and terminates the process.
    pub fn exit(&self) -> ! {
        match self {
            Error::Usage(err) => err.exit(),
            other => {
                eprintln!("{other}");
                std::process::exit(2)
            }
        }
    }

    /// The code [`Error::exit`] terminates with.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(err) => err.exit_code(),
            _ => 2,
        }
    }

    /// The error is a request for help or version output, not a failure.
    pub fn is_help(&self) -> bool {
        matches!(
            self,
            Error::Usage(err) if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            )
        )
    }
}

/// A declared argument class. Usually implemented with `#[derive(Args)]`.
pub trait Args: Sized {
    /// Class name, as used in binding keys and `Instance::class`.
    const NAME: &'static str;

    fn class() -> Class;

    fn from_bound(bound: &Bound) -> Result<Self>;

    fn program() -> Result<Program> {
        Program::new(Self::class())
    }

    fn from_env_or_exit() -> Self {
        Self::from_env().unwrap_or_else(|err| err.exit())
    }

    fn from_env() -> Result<Self> {
        Self::program()?.from_env()?.args()
    }

    fn from_vec(args: Vec<OsString>) -> Result<Self> {
        Self::program()?.from_vec(args)?.args()
    }
}
