//! Per-class registry: the merged, shape-annotated declarations of a class
//! and all of its ancestors.
use crate::{
    decl::{ArgumentDeclaration, Class, Member, SubcommandDeclaration},
    specless,
    ty::{self, Scope, Shape},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub attr: String,
    pub decl: ArgumentDeclaration,
    /// `None` when the declared type could not be resolved.
    pub shape: Option<Shape>,
}

impl Entry {
    pub fn binding_key(&self) -> String {
        self.decl.binding_key(&self.attr)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    class: String,
    about: Option<String>,
    entries: Vec<Entry>,
    subcommands: Vec<SubcommandDeclaration>,
}

impl Registry {
    /// Merges the levels of `class` base-to-derived. A name declared again
    /// keeps its position and takes the later declaration.
    pub fn compile(class: &Class) -> Registry {
        let mut res = Registry {
            class: class.name().to_string(),
            about: class.about_text().map(str::to_string),
            entries: Vec::new(),
            subcommands: Vec::new(),
        };
        let mut scope = Scope::new();

        for level in class.levels() {
            scope.extend(&level.scope);

            for sub in &level.subcommands {
                if res.subcommand(&sub.name).is_some() {
                    tracing::debug!(
                        class = %res.class,
                        level = %level.owner,
                        subcommand = %sub.name,
                        "subcommand redeclared"
                    );
                }
                upsert(&mut res.subcommands, sub.clone(), |it| it.name == sub.name);
            }

            for member in &level.members {
                let entry = compile_member(member, &scope, &level.owner);
                let attr = entry.attr.clone();
                upsert(&mut res.entries, entry, |it| it.attr == attr);
            }
        }

        tracing::debug!(
            class = %res.class,
            args = res.entries.len(),
            subcommands = res.subcommands.len(),
            "compiled registry"
        );
        res
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, attr: &str) -> Option<&Entry> {
        self.entries.iter().find(|it| it.attr == attr)
    }

    pub fn subcommands(&self) -> &[SubcommandDeclaration] {
        &self.subcommands
    }

    pub fn subcommand(&self, name: &str) -> Option<&SubcommandDeclaration> {
        self.subcommands.iter().find(|it| it.name == name)
    }

    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }
}

fn compile_member(member: &Member, scope: &Scope, owner: &str) -> Entry {
    let attr = member.attr().to_string();
    let ty = match member {
        Member::Arg { ty, .. } => ty,
        Member::Field(field) => &field.ty,
    };
    let shape = match ty::infer(ty, scope) {
        Ok(it) => Some(it),
        Err(err) => {
            tracing::warn!(
                class = %owner,
                field = %attr,
                error = %err,
                "could not analyze the declared type, registering it without type information"
            );
            None
        }
    };

    let mut decl = match member {
        Member::Arg { decl, .. } => decl.clone(),
        Member::Field(field) => specless::declaration(field, shape.as_ref()),
    };
    if let Some(shape) = &shape {
        apply(&mut decl, shape);
    }
    Entry { attr, decl, shape }
}

/// Inferred values only fill what the declaration left unset.
fn apply(decl: &mut ArgumentDeclaration, shape: &Shape) {
    if decl.choices.is_none() {
        decl.choices = shape.choices.clone();
    }
    if decl.coercer.is_none() {
        decl.coercer = shape.coercer.clone();
    }
    if decl.nargs.is_none() {
        decl.nargs = shape.tuple_arity;
    }
}

fn upsert<T>(items: &mut Vec<T>, item: T, same: impl Fn(&T) -> bool) {
    match items.iter_mut().find(|it| same(it)) {
        Some(slot) => *slot = item,
        None => items.push(item),
    }
}
