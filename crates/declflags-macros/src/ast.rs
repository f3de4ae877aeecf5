#[derive(Debug)]
pub(crate) struct Args {
    /// The struct's identifier.
    pub(crate) ident: String,
    /// Class name, defaults to the identifier.
    pub(crate) name: String,
    pub(crate) doc: Option<String>,
    pub(crate) unit: bool,
    pub(crate) fields: Vec<Field>,
    pub(crate) subcommands: Vec<Subcommand>,
    pub(crate) aliases: Vec<Alias>,
}

impl Args {
    pub(crate) fn base(&self) -> Option<&Field> {
        self.fields.iter().find(|it| matches!(it.kind, FieldKind::Base))
    }
}

#[derive(Debug)]
pub(crate) struct Field {
    pub(crate) ident: String,
    pub(crate) ty: String,
    pub(crate) doc: Option<String>,
    pub(crate) kind: FieldKind,
}

impl Field {
    /// The attribute name, without a raw identifier prefix.
    pub(crate) fn attr(&self) -> &str {
        self.ident.trim_start_matches("r#")
    }
}

#[derive(Debug)]
pub(crate) enum FieldKind {
    /// `#[arg(base)]`: the parent class, filled from the same results.
    Base,
    /// `#[arg("-n", "--name", ...)]`
    Arg { names: Vec<String>, settings: Vec<Setting> },
    /// A field without names, flags derived from its name and type.
    Plain { settings: Vec<Setting> },
}

/// `key = expr`, or a bare `key`.
#[derive(Debug)]
pub(crate) struct Setting {
    pub(crate) key: String,
    pub(crate) value: Option<String>,
}

#[derive(Debug)]
pub(crate) struct Subcommand {
    pub(crate) name: String,
    pub(crate) ty: String,
    pub(crate) help: Option<String>,
    pub(crate) description: Option<String>,
}

#[derive(Debug)]
pub(crate) struct Alias {
    pub(crate) name: String,
    pub(crate) ty: String,
}
