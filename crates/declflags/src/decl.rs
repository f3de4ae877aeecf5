//! Static declarations: what a class says about its fields and subcommands.
use crate::{
    ty::{Coercer, Scope, Ty},
    Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Store,
    StoreConst,
    StoreTrue,
    StoreFalse,
    Append,
    AppendConst,
    Count,
    Help,
    Version,
    Extend,
}

impl Action {
    /// Toggles, counters, help and version don't take values, so neither a
    /// coercer nor a choice set applies to them.
    pub fn takes_values(self) -> bool {
        !matches!(
            self,
            Action::StoreConst
                | Action::StoreTrue
                | Action::StoreFalse
                | Action::AppendConst
                | Action::Count
                | Action::Help
                | Action::Version
        )
    }
}

/// How many tokens one occurrence consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nargs {
    Exactly(usize),
    /// `?`
    ZeroOrOne,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Nargs {
    pub fn min(self) -> usize {
        match self {
            Nargs::Exactly(n) => n,
            Nargs::ZeroOrOne | Nargs::ZeroOrMore => 0,
            Nargs::OneOrMore => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DefaultValue {
    #[default]
    Unset,
    Value(Value),
    /// Leave the binding key out of the results when absent.
    Suppress,
}

/// One declared argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDeclaration {
    pub names: Vec<String>,
    pub action: Action,
    pub nargs: Option<Nargs>,
    pub constant: Option<Value>,
    pub default: DefaultValue,
    pub choices: Option<Vec<Value>>,
    pub required: bool,
    pub help: Option<String>,
    pub metavar: Option<String>,
    pub version: Option<String>,
    pub coercer: Option<Coercer>,
    pub dest: Option<String>,
}

impl ArgumentDeclaration {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> ArgumentDeclaration {
        ArgumentDeclaration {
            names: names.into_iter().map(Into::into).collect(),
            action: Action::Store,
            nargs: None,
            constant: None,
            default: DefaultValue::Unset,
            choices: None,
            required: false,
            help: None,
            metavar: None,
            version: None,
            coercer: None,
            dest: None,
        }
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub fn nargs(mut self, nargs: Nargs) -> Self {
        self.nargs = Some(nargs);
        self
    }

    pub fn constant(mut self, constant: impl Into<Value>) -> Self {
        self.constant = Some(constant.into());
        self
    }

    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default = DefaultValue::Value(default.into());
        self
    }

    pub fn suppress(mut self) -> Self {
        self.default = DefaultValue::Suppress;
        self
    }

    pub fn choices<V: Into<Value>>(mut self, choices: impl IntoIterator<Item = V>) -> Self {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar = Some(metavar.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn coercer(mut self, coercer: Coercer) -> Self {
        self.coercer = Some(coercer);
        self
    }

    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    /// No name carries the `-` prefix.
    pub fn is_positional(&self) -> bool {
        !self.names.iter().any(|it| it.starts_with('-'))
    }

    /// Where the parsed value is looked up for the field `attr`.
    pub fn binding_key(&self, attr: &str) -> String {
        if self.is_positional() {
            if let Some(name) = self.names.first() {
                return name.clone();
            }
        }
        self.dest.clone().unwrap_or_else(|| attr.to_string())
    }
}

/// A plain typed attribute with no declaration object.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub attr: String,
    pub ty: Ty,
    pub default: Option<Value>,
    pub help: Option<String>,
}

impl Field {
    pub fn new(attr: impl Into<String>, ty: Ty) -> Field {
        Field { attr: attr.into(), ty, default: None, help: None }
    }

    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubcommandDeclaration {
    pub name: String,
    pub class: Class,
    pub help: Option<String>,
    pub description: Option<String>,
}

impl SubcommandDeclaration {
    pub fn new(name: impl Into<String>, class: Class) -> SubcommandDeclaration {
        SubcommandDeclaration { name: name.into(), class, help: None, description: None }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Member {
    Arg { attr: String, decl: ArgumentDeclaration, ty: Ty },
    Field(Field),
}

impl Member {
    pub(crate) fn attr(&self) -> &str {
        match self {
            Member::Arg { attr, .. } => attr,
            Member::Field(field) => &field.attr,
        }
    }
}

/// What one class in a hierarchy declares by itself.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Level {
    pub(crate) owner: String,
    pub(crate) scope: Scope,
    pub(crate) members: Vec<Member>,
    pub(crate) subcommands: Vec<SubcommandDeclaration>,
}

impl Level {
    fn new(owner: String) -> Level {
        Level { owner, scope: Scope::new(), members: Vec::new(), subcommands: Vec::new() }
    }
}

/// A declared argument class: its own level plus the levels of its
/// ancestors, base first.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    name: String,
    about: Option<String>,
    levels: Vec<Level>,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Class {
        let name = name.into();
        Class { levels: vec![Level::new(name.clone())], name, about: None }
    }

    /// A subclass of `self`: inherits every declaration, and its own
    /// declarations replace same-named ones.
    pub fn extend(&self, name: impl Into<String>) -> Class {
        let name = name.into();
        let mut levels = self.levels.clone();
        levels.push(Level::new(name.clone()));
        Class { name, about: None, levels }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn about_text(&self) -> Option<&str> {
        self.about.as_deref()
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// A field with an explicit declaration.
    pub fn arg(mut self, attr: impl Into<String>, decl: ArgumentDeclaration, ty: Ty) -> Self {
        self.own().members.push(Member::Arg { attr: attr.into(), decl, ty });
        self
    }

    /// A specless field.
    pub fn field(mut self, field: Field) -> Self {
        self.own().members.push(Member::Field(field));
        self
    }

    pub fn subcommand(mut self, subcommand: SubcommandDeclaration) -> Self {
        self.own().subcommands.push(subcommand);
        self
    }

    /// A type alias usable through `Ty::Named` by this class and its subclasses.
    pub fn alias(mut self, name: impl Into<String>, ty: Ty) -> Self {
        self.own().scope.insert(name, ty);
        self
    }

    pub(crate) fn levels(&self) -> &[Level] {
        &self.levels
    }

    fn own(&mut self) -> &mut Level {
        // `new` and `extend` always push the class's own level last.
        let last = self.levels.len() - 1;
        &mut self.levels[last]
    }
}
