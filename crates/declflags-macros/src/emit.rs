use crate::ast;

use std::fmt::Write;

macro_rules! w {
    ($($tt:tt)*) => {
        drop(write!($($tt)*))
    };
}

pub(crate) fn emit(args: &ast::Args) -> String {
    let mut buf = String::new();

    w!(buf, "impl ::declflags::Args for {} {{\n", args.ident);
    w!(buf, "    const NAME: &'static str = {:?};\n", args.name);
    blank_line(&mut buf);
    emit_class(&mut buf, args);
    blank_line(&mut buf);
    emit_from_bound(&mut buf, args);
    w!(buf, "}}\n");

    buf
}

fn emit_class(buf: &mut String, args: &ast::Args) {
    w!(buf, "    fn class() -> ::declflags::Class {{\n");
    match args.base() {
        Some(base) => {
            w!(buf, "        <{} as ::declflags::Args>::class().extend(Self::NAME)\n", base.ty)
        }
        None => w!(buf, "        ::declflags::Class::new(Self::NAME)\n"),
    }
    if let Some(doc) = &args.doc {
        w!(buf, "            .about({doc:?})\n");
    }
    for alias in &args.aliases {
        w!(buf, "            .alias({:?}, {})\n", alias.name, alias.ty);
    }
    for field in &args.fields {
        match &field.kind {
            ast::FieldKind::Base => (),
            ast::FieldKind::Arg { names, settings } => emit_arg(buf, field, names, settings),
            ast::FieldKind::Plain { settings } => emit_plain(buf, field, settings),
        }
    }
    for sub in &args.subcommands {
        w!(
            buf,
            "            .subcommand(::declflags::SubcommandDeclaration::new({:?}, <{} as ::declflags::Args>::class())",
            sub.name,
            sub.ty
        );
        if let Some(help) = &sub.help {
            w!(buf, ".help({help})");
        }
        if let Some(description) = &sub.description {
            w!(buf, ".description({description})");
        }
        w!(buf, ")\n");
    }
    w!(buf, "    }}\n");
}

fn emit_arg(buf: &mut String, field: &ast::Field, names: &[String], settings: &[ast::Setting]) {
    let names = names.iter().map(|it| format!("{it:?}")).collect::<Vec<_>>().join(", ");
    w!(buf, "            .arg(\n");
    w!(buf, "                {:?},\n", field.attr());
    w!(buf, "                ::declflags::ArgumentDeclaration::new([{names}])");
    for setting in settings {
        match (setting.key.as_str(), &setting.value) {
            ("ty", _) => (),
            ("required", None) => w!(buf, ".required(true)"),
            ("suppress", _) => w!(buf, ".suppress()"),
            (key, Some(value)) => w!(buf, ".{key}({value})"),
            (key, None) => w!(buf, ".{key}()"),
        }
    }
    emit_doc_help(buf, field, settings);
    w!(buf, ",\n");
    w!(buf, "                {},\n", ty(field, settings));
    w!(buf, "            )\n");
}

fn emit_plain(buf: &mut String, field: &ast::Field, settings: &[ast::Setting]) {
    w!(buf, "            .field(::declflags::Field::new({:?}, {})", field.attr(), ty(field, settings));
    for setting in settings {
        if let ("default" | "help", Some(value)) = (setting.key.as_str(), &setting.value) {
            w!(buf, ".{}({value})", setting.key);
        }
    }
    emit_doc_help(buf, field, settings);
    w!(buf, ")\n");
}

/// Doc comments are the help text unless `help` is given.
fn emit_doc_help(buf: &mut String, field: &ast::Field, settings: &[ast::Setting]) {
    if let Some(doc) = &field.doc {
        if !settings.iter().any(|it| it.key == "help") {
            w!(buf, ".help({doc:?})");
        }
    }
}

fn ty(field: &ast::Field, settings: &[ast::Setting]) -> String {
    match settings.iter().find(|it| it.key == "ty").and_then(|it| it.value.as_ref()) {
        Some(ty) => ty.clone(),
        None => format!("::declflags::Ty::of::<{}>()", field.ty),
    }
}

fn emit_from_bound(buf: &mut String, args: &ast::Args) {
    w!(buf, "    fn from_bound(bound: &::declflags::Bound) -> ::declflags::Result<Self> {{\n");
    if args.unit {
        w!(buf, "        let _ = bound;\n");
        w!(buf, "        Ok({})\n", args.ident);
        w!(buf, "    }}\n");
        return;
    }
    w!(buf, "        Ok({} {{\n", args.ident);
    for field in &args.fields {
        match field.kind {
            ast::FieldKind::Base => w!(
                buf,
                "            {}: <{} as ::declflags::Args>::from_bound(bound)?,\n",
                field.ident,
                field.ty
            ),
            _ => w!(
                buf,
                "            {}: bound.get::<{}>({:?})?,\n",
                field.ident,
                field.ty,
                field.attr()
            ),
        }
    }
    w!(buf, "        }})\n");
    w!(buf, "    }}\n");
}

fn blank_line(buf: &mut String) {
    w!(buf, "\n");
}
