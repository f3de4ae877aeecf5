//! The `clap` boundary: registries become a `clap::Command`, and
//! `clap::ArgMatches` become a flat [`Namespace`].
use std::collections::HashSet;

use clap::{builder::ValueRange, parser::ValueSource, Arg, ArgAction, ArgMatches, Command};

use crate::{
    bind::Namespace,
    decl::{Action, ArgumentDeclaration, DefaultValue, Nargs},
    registry::{Entry, Registry},
    tree::Program,
    Error, Result, Value,
};

/// Rejects declarations clap can't express.
pub(crate) fn validate(registry: &Registry) -> Result<()> {
    let mut keys = HashSet::new();
    let mut spellings = HashSet::new();
    for entry in registry.entries() {
        let decl = &entry.decl;
        let err = |reason: String| Error::Declaration {
            class: registry.class().to_string(),
            field: entry.attr.clone(),
            reason,
        };

        if decl.names.is_empty() {
            return Err(err("no name or flag given".to_string()));
        }
        if decl.is_positional() {
            if decl.names.len() != 1 {
                return Err(err(format!("a positional takes one name, got {:?}", decl.names)));
            }
            if !decl.action.takes_values() {
                return Err(err(format!("a positional can't use {:?}", decl.action)));
            }
        } else {
            for name in &decl.names {
                let valid = match name.strip_prefix("--") {
                    Some(long) => !long.is_empty(),
                    None => name.starts_with('-') && name.chars().count() == 2,
                };
                if !valid {
                    return Err(err(format!(
                        "`{name}` is neither a `--long` flag nor a one-letter `-s` flag"
                    )));
                }
                if !spellings.insert(name.clone()) {
                    return Err(err(format!("`{name}` is declared twice")));
                }
            }
        }

        match decl.action {
            Action::StoreConst | Action::AppendConst if decl.constant.is_none() => {
                return Err(err(format!("{:?} needs a constant", decl.action)));
            }
            Action::Version if decl.version.is_none() => {
                return Err(err("the version action needs a version string".to_string()));
            }
            _ => (),
        }

        let key = entry.binding_key();
        if !keys.insert(key.clone()) {
            return Err(err(format!("binding key `{key}` is already taken")));
        }
    }
    Ok(())
}

pub(crate) fn command(program: &Program, name: String) -> Command {
    let mut cmd = Command::new(name);
    if let Some(about) = program.root().registry().about() {
        cmd = cmd.about(about.to_string());
    }
    if let Some(version) = &program.settings().version {
        cmd = cmd.version(version.clone());
    }
    configure(cmd, program, 0)
}

fn configure(mut cmd: Command, program: &Program, idx: usize) -> Command {
    let node = &program.nodes()[idx];
    let registry = node.registry();

    cmd = cmd
        .infer_long_args(program.settings().allow_abbrev)
        .args_override_self(true)
        .disable_help_subcommand(true);

    for entry in registry.entries() {
        let decl = &entry.decl;
        match decl.action {
            Action::Help if claims_help(decl) => cmd = cmd.disable_help_flag(true),
            Action::Version => {
                cmd = cmd.disable_version_flag(true);
                if let Some(version) = &decl.version {
                    cmd = cmd.version(version.clone());
                }
            }
            _ => (),
        }
        cmd = cmd.arg(arg(entry));
    }

    if registry.has_subcommands() {
        // a pure dispatcher has nothing to do without a subcommand
        cmd = cmd.subcommand_required(registry.entries().is_empty());
        for (name, child) in &node.children {
            let Some(sub) = registry.subcommand(name) else { continue };
            let mut sub_cmd = Command::new(name.clone());
            if let Some(help) = &sub.help {
                sub_cmd = sub_cmd.about(help.clone());
            }
            if let Some(description) = sub.description.as_ref().or(sub.help.as_ref()) {
                sub_cmd = sub_cmd.long_about(description.clone());
            }
            cmd = cmd.subcommand(configure(sub_cmd, program, *child));
        }
    }
    cmd
}

fn claims_help(decl: &ArgumentDeclaration) -> bool {
    decl.names.iter().any(|it| it == "-h" || it == "--help")
}

/// The clap id of a binding key, kept apart from clap's own `help` and `version`.
fn id(key: &str) -> String {
    format!("decl:{key}")
}

fn arg(entry: &Entry) -> Arg {
    let decl = &entry.decl;
    let key = entry.binding_key();
    let mut arg = Arg::new(id(&key));

    if decl.is_positional() {
        arg = arg.required(decl.nargs.map_or(true, |it| it.min() > 0));
    } else {
        let mut longs = decl.names.iter().filter_map(|it| it.strip_prefix("--"));
        let mut shorts = decl
            .names
            .iter()
            .filter(|it| !it.starts_with("--"))
            .filter_map(|it| it.chars().nth(1));
        if let Some(long) = longs.next() {
            arg = arg.long(long.to_string());
        }
        for long in longs {
            arg = arg.visible_alias(long.to_string());
        }
        if let Some(short) = shorts.next() {
            arg = arg.short(short);
        }
        for short in shorts {
            arg = arg.visible_short_alias(short);
        }
        if decl.required {
            arg = arg.required(true);
        }
    }

    if let Some(help) = &decl.help {
        arg = arg.help(help.clone());
    }

    arg = arg.action(match decl.action {
        Action::Store => ArgAction::Set,
        Action::StoreConst | Action::StoreTrue => ArgAction::SetTrue,
        Action::StoreFalse => ArgAction::SetFalse,
        Action::Append | Action::Extend => ArgAction::Append,
        Action::AppendConst | Action::Count => ArgAction::Count,
        Action::Help => ArgAction::Help,
        Action::Version => ArgAction::Version,
    });

    if decl.action.takes_values() {
        arg = arg
            .value_parser(value_parser(decl))
            .value_name(decl.metavar.clone().unwrap_or(key));
        if let Some(nargs) = decl.nargs {
            arg = arg.num_args(value_range(nargs));
        }
        if decl.coercer.as_ref().is_some_and(|it| it.is_numeric()) {
            arg = arg.allow_negative_numbers(true);
        }
    }
    arg
}

fn value_range(nargs: Nargs) -> ValueRange {
    match nargs {
        Nargs::Exactly(n) => ValueRange::new(n),
        Nargs::ZeroOrOne => ValueRange::new(0..=1),
        Nargs::ZeroOrMore => ValueRange::new(0..),
        Nargs::OneOrMore => ValueRange::new(1..),
    }
}

/// Coerces one token and checks it against the choice set.
fn value_parser(
    decl: &ArgumentDeclaration,
) -> impl Fn(&str) -> Result<Value, String> + Clone + Send + Sync + 'static {
    let coercer = decl.coercer.clone();
    let choices = decl.choices.clone();
    move |raw: &str| {
        let value = match &coercer {
            Some(coercer) => coercer.coerce(raw)?,
            None => Value::Str(raw.to_string()),
        };
        if let Some(choices) = &choices {
            if !choices.contains(&value) {
                let expected =
                    choices.iter().map(|it| format!("'{it}'")).collect::<Vec<_>>().join(", ");
                return Err(format!("invalid choice: '{raw}' (choose from {expected})"));
            }
        }
        Ok(value)
    }
}

/// Flattens the matches of every level into one namespace.
pub(crate) fn collect(program: &Program, matches: &ArgMatches) -> Namespace {
    let mut ns = Namespace::default();
    collect_into(program, 0, matches, &mut ns);
    ns
}

fn collect_into(program: &Program, idx: usize, matches: &ArgMatches, ns: &mut Namespace) {
    let node = &program.nodes()[idx];
    for entry in node.registry().entries() {
        let key = entry.binding_key();
        match input(&entry.decl, &id(&key), matches) {
            Some(value) => ns.insert_input(key, value),
            None => {
                if let Some(value) = absent(&entry.decl) {
                    ns.insert_default(key, value);
                }
            }
        }
    }

    if let Some((name, sub_matches)) = matches.subcommand() {
        if let Some(child) = node.child(name) {
            ns.insert_input(node.binding_key(), Value::from(name));
            collect_into(program, child, sub_matches, ns);
        }
    }
}

/// The value of an argument that appeared on the command line, looked up by clap id.
fn input(decl: &ArgumentDeclaration, key: &str, matches: &ArgMatches) -> Option<Value> {
    if matches.value_source(key) != Some(ValueSource::CommandLine) {
        return None;
    }
    let constant = || decl.constant.clone().unwrap_or(Value::None);
    let value = match decl.action {
        Action::Store => {
            let mut values = values(matches, key);
            match decl.nargs {
                None => values.pop().unwrap_or(Value::None),
                Some(Nargs::ZeroOrOne) => values.pop().unwrap_or_else(constant),
                Some(_) => Value::List(values),
            }
        }
        Action::StoreConst => constant(),
        Action::StoreTrue => Value::Bool(true),
        Action::StoreFalse => Value::Bool(false),
        Action::Append => {
            let items = occurrences(matches, key)
                .into_iter()
                .map(|mut values| match decl.nargs {
                    None => values.pop().unwrap_or(Value::None),
                    Some(Nargs::ZeroOrOne) => values.pop().unwrap_or_else(constant),
                    Some(_) => Value::List(values),
                })
                .collect();
            extend_default(decl, items)
        }
        Action::Extend => extend_default(decl, values(matches, key)),
        Action::AppendConst => extend_default(decl, vec![constant(); count(matches, key)]),
        Action::Count => {
            let start = match &decl.default {
                DefaultValue::Value(Value::Int(it)) => *it,
                _ => 0,
            };
            Value::Int(start + count(matches, key) as i64)
        }
        Action::Help | Action::Version => return None,
    };
    Some(value)
}

/// Appending actions start from a copy of a list default.
fn extend_default(decl: &ArgumentDeclaration, items: Vec<Value>) -> Value {
    match &decl.default {
        DefaultValue::Value(Value::List(default)) => {
            Value::List(default.iter().cloned().chain(items).collect())
        }
        _ => Value::List(items),
    }
}

/// The value of an argument that did not appear, `None` to leave it out.
fn absent(decl: &ArgumentDeclaration) -> Option<Value> {
    let value = match &decl.default {
        DefaultValue::Suppress => return None,
        DefaultValue::Value(value) => value.clone(),
        DefaultValue::Unset => match decl.action {
            Action::StoreTrue => Value::Bool(false),
            Action::StoreFalse => Value::Bool(true),
            Action::Help | Action::Version => return None,
            _ if decl.is_positional() && decl.nargs == Some(Nargs::ZeroOrMore) => {
                Value::List(Vec::new())
            }
            _ => Value::None,
        },
    };
    Some(value)
}

fn values(matches: &ArgMatches, key: &str) -> Vec<Value> {
    match matches.try_get_many::<Value>(key) {
        Ok(Some(values)) => values.cloned().collect(),
        _ => Vec::new(),
    }
}

fn occurrences(matches: &ArgMatches, key: &str) -> Vec<Vec<Value>> {
    match matches.try_get_occurrences::<Value>(key) {
        Ok(Some(occurrences)) => occurrences.map(|it| it.cloned().collect()).collect(),
        _ => Vec::new(),
    }
}

fn count(matches: &ArgMatches, key: &str) -> usize {
    match matches.try_get_one::<u8>(key) {
        Ok(Some(n)) => *n as usize,
        _ => 0,
    }
}
