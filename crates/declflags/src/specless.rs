//! Declarations synthesized for plain typed fields.
use crate::{
    decl::{Action, ArgumentDeclaration, DefaultValue, Field, Nargs},
    ty::Shape,
    Value,
};

/// `shape` is `None` when the field's type could not be resolved; the
/// declaration then falls back to what the raw `Ty` says.
pub(crate) fn declaration(field: &Field, shape: Option<&Shape>) -> ArgumentDeclaration {
    let positional = is_positional_name(&field.attr);
    let mut decl = if positional {
        ArgumentDeclaration::new([field.attr.clone()])
    } else {
        ArgumentDeclaration::new([flag_name(&field.attr)]).dest(field.attr.clone())
    };
    decl.help = field.help.clone();

    let optional = shape.map_or(field.ty.is_optional(), |it| it.optional);
    let container = shape.is_some_and(|it| it.as_list || it.as_tuple);
    let is_bool = shape.map_or(field.ty.is_bool(), |it| !container && it.nominal.is_bool());

    match (&field.default, is_bool) {
        (Some(Value::Bool(false)), true) => {
            decl.action = Action::StoreTrue;
            decl.default = DefaultValue::Value(Value::Bool(false));
            return decl;
        }
        (Some(Value::Bool(true)), true) => {
            decl.action = Action::StoreFalse;
            decl.default = DefaultValue::Value(Value::Bool(true));
            return decl;
        }
        _ => (),
    }

    if let Some(shape) = shape {
        if shape.as_list {
            decl.nargs = Some(Nargs::ZeroOrMore);
        } else if let Some(arity) = shape.tuple_arity {
            decl.nargs = Some(arity);
        }
    }
    if positional && optional && decl.nargs.is_none() {
        decl.nargs = Some(Nargs::ZeroOrOne);
    }

    match &field.default {
        Some(value) => decl.default = DefaultValue::Value(value.clone()),
        None if optional => decl.default = DefaultValue::Value(Value::None),
        None => decl.required = !positional,
    }
    decl
}

/// `POSITIONAL` names become positionals, everything else a `--flag`.
fn is_positional_name(attr: &str) -> bool {
    attr.chars().any(char::is_alphabetic) && attr.to_uppercase() == attr
}

fn flag_name(attr: &str) -> String {
    format!("--{}", attr.to_lowercase().replace('_', "-"))
}
