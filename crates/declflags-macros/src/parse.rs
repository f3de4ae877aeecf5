use std::{fmt, mem};

#[cfg(not(test))]
use proc_macro::{Delimiter, Spacing, TokenStream, TokenTree};
#[cfg(test)]
use proc_macro2::{Delimiter, Spacing, TokenStream, TokenTree};

use crate::ast;

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub(crate) struct Error {
    msg: String,
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.msg, f)
    }
}

macro_rules! format_err {
    ($($tt:tt)*) => {
        Error { msg: format!($($tt)*) }
    };
}

macro_rules! bail {
    ($($tt:tt)*) => {
        return Err(format_err!($($tt)*))
    };
}

const ARG_KEYS: &[&str] = &[
    "action", "nargs", "constant", "default", "choices", "required", "suppress", "help", "metavar",
    "version", "coercer", "dest", "ty",
];

/// Keys a field without names accepts.
const FIELD_KEYS: &[&str] = &["default", "help", "ty"];

pub(crate) fn args(ts: TokenStream) -> Result<ast::Args> {
    let p = &mut Parser::new(ts);
    let mut res = ast::Args {
        ident: String::new(),
        name: String::new(),
        doc: None,
        unit: false,
        fields: Vec::new(),
        subcommands: Vec::new(),
        aliases: Vec::new(),
    };

    let mut doc = Vec::new();
    let mut name = None;
    while p.eat_punct('#') {
        p.enter_delim(Delimiter::Bracket)?;
        if p.eat_keyword("doc") {
            doc.push(doc_line(p)?);
        } else if p.eat_keyword("args") {
            p.enter_delim(Delimiter::Parenthesis)?;
            struct_settings(p, &mut res, &mut name)?;
            p.exit_delim()?;
        } else {
            p.skip_rest();
        }
        p.exit_delim()?;
    }
    res.doc = join_doc(doc);

    visibility(p);
    if !p.eat_keyword("struct") {
        bail!("only structs can derive `Args`")
    }
    res.ident = p.expect_ident()?;
    if p.lookahead_punct('<', 0) {
        bail!("generic structs can't derive `Args`")
    }
    res.name = name.unwrap_or_else(|| res.ident.clone());

    if p.eat_punct(';') {
        res.unit = true;
        return Ok(res);
    }
    if p.at_delim(Delimiter::Parenthesis) {
        bail!("tuple structs can't derive `Args`")
    }
    p.enter_delim(Delimiter::Brace)?;
    while !p.end() {
        res.fields.push(field(p)?);
        if !p.eat_punct(',') {
            break;
        }
    }
    p.exit_delim()?;

    if res.fields.iter().filter(|it| matches!(it.kind, ast::FieldKind::Base)).count() > 1 {
        bail!("only one field can be the `base`")
    }
    Ok(res)
}

fn struct_settings(p: &mut Parser, res: &mut ast::Args, name: &mut Option<String>) -> Result<()> {
    while !p.end() {
        let key = p.expect_ident()?;
        match key.as_str() {
            "name" => {
                p.expect_punct('=')?;
                *name = Some(p.expect_string()?);
            }
            "subcommand" => {
                p.enter_delim(Delimiter::Parenthesis)?;
                res.subcommands.push(subcommand(p)?);
                p.exit_delim()?;
            }
            "alias" => {
                p.enter_delim(Delimiter::Parenthesis)?;
                let name = p.expect_string()?;
                p.expect_punct(',')?;
                let ty = p.until_comma()?;
                p.eat_punct(',');
                p.exit_delim()?;
                res.aliases.push(ast::Alias { name, ty });
            }
            _ => bail!("unknown `args` key `{key}`, expected `name`, `subcommand` or `alias`"),
        }
        if !p.eat_punct(',') {
            break;
        }
    }
    Ok(())
}

fn subcommand(p: &mut Parser) -> Result<ast::Subcommand> {
    let name = p.expect_string()?;
    p.expect_punct(',')?;
    let ty = p.until_comma()?;
    let mut res = ast::Subcommand { name, ty, help: None, description: None };
    while p.eat_punct(',') && !p.end() {
        let key = p.expect_ident()?;
        p.expect_punct('=')?;
        let value = p.until_comma()?;
        match key.as_str() {
            "help" => res.help = Some(value),
            "description" => res.description = Some(value),
            _ => bail!("unknown subcommand key `{key}`, expected `help` or `description`"),
        }
    }
    Ok(res)
}

fn field(p: &mut Parser) -> Result<ast::Field> {
    let mut doc = Vec::new();
    let mut kind = None;
    while p.eat_punct('#') {
        p.enter_delim(Delimiter::Bracket)?;
        if p.eat_keyword("doc") {
            doc.push(doc_line(p)?);
        } else if p.eat_keyword("arg") {
            if kind.is_some() {
                bail!("duplicate `arg` attribute")
            }
            p.enter_delim(Delimiter::Parenthesis)?;
            kind = Some(arg_attr(p)?);
            p.exit_delim()?;
        } else {
            p.skip_rest();
        }
        p.exit_delim()?;
    }

    visibility(p);
    let ident = p.expect_ident()?;
    p.expect_punct(':')?;
    let ty = p.until_comma()?;
    Ok(ast::Field {
        ident,
        ty,
        doc: join_doc(doc),
        kind: kind.unwrap_or(ast::FieldKind::Plain { settings: Vec::new() }),
    })
}

fn arg_attr(p: &mut Parser) -> Result<ast::FieldKind> {
    let mut names = Vec::new();
    let mut settings = Vec::new();
    let mut base = false;
    while !p.end() {
        if let Some(name) = p.eat_string() {
            names.push(name);
        } else {
            let key = p.expect_ident()?;
            let value = if p.eat_punct('=') { Some(p.until_comma()?) } else { None };
            match (key.as_str(), &value) {
                ("base", None) => base = true,
                ("base" | "suppress", Some(_)) => bail!("`{key}` takes no value"),
                ("required" | "suppress", _) => {}
                (_, None) => bail!("expected `{key} = ...`"),
                _ => {}
            }
            if key != "base" {
                if !ARG_KEYS.contains(&key.as_str()) {
                    bail!("unknown `arg` key `{key}`")
                }
                settings.push(ast::Setting { key, value });
            }
        }
        if !p.eat_punct(',') {
            break;
        }
    }

    if base {
        if !names.is_empty() || !settings.is_empty() {
            bail!("`base` takes no other settings")
        }
        return Ok(ast::FieldKind::Base);
    }
    if names.is_empty() {
        if let Some(it) = settings.iter().find(|it| !FIELD_KEYS.contains(&it.key.as_str())) {
            bail!("`{}` needs flag or positional names", it.key)
        }
        return Ok(ast::FieldKind::Plain { settings });
    }
    Ok(ast::FieldKind::Arg { names, settings })
}

fn doc_line(p: &mut Parser) -> Result<String> {
    p.expect_punct('=')?;
    let res = p.expect_string()?;
    Ok(res.strip_prefix(' ').map(str::to_string).unwrap_or(res))
}

fn join_doc(lines: Vec<String>) -> Option<String> {
    let res = lines.join("\n");
    let res = res.trim();
    if res.is_empty() {
        None
    } else {
        Some(res.to_string())
    }
}

fn visibility(p: &mut Parser) {
    if p.eat_keyword("pub") && p.at_delim(Delimiter::Parenthesis) {
        p.ts.pop();
    }
}

struct Parser {
    stack: Vec<Vec<TokenTree>>,
    ts: Vec<TokenTree>,
}

impl Parser {
    fn new(ts: TokenStream) -> Self {
        let mut ts = ts.into_iter().collect::<Vec<_>>();
        ts.reverse();
        Self { stack: Vec::new(), ts }
    }

    fn enter_delim(&mut self, delimiter: Delimiter) -> Result<()> {
        match self.ts.pop() {
            Some(TokenTree::Group(g)) if g.delimiter() == delimiter => {
                let mut ts = g.stream().into_iter().collect::<Vec<_>>();
                ts.reverse();
                let ts = mem::replace(&mut self.ts, ts);
                self.stack.push(ts);
            }
            _ => bail!("expected `{}`", open(delimiter)),
        }
        Ok(())
    }
    fn exit_delim(&mut self) -> Result<()> {
        if !self.end() {
            let next = self.ts.last().map(|it| it.to_string()).unwrap_or_default();
            bail!("unexpected `{next}`")
        }
        match self.stack.pop() {
            Some(ts) => self.ts = ts,
            None => bail!("unbalanced delimiters"),
        }
        Ok(())
    }
    fn at_delim(&self, delimiter: Delimiter) -> bool {
        matches!(self.ts.last(), Some(TokenTree::Group(g)) if g.delimiter() == delimiter)
    }
    fn end(&self) -> bool {
        self.ts.last().is_none()
    }
    fn skip_rest(&mut self) {
        self.ts.clear();
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.at_keyword(kw) {
            self.ts.pop();
            true
        } else {
            false
        }
    }
    fn at_keyword(&self, kw: &str) -> bool {
        match self.ts.last() {
            Some(TokenTree::Ident(ident)) => ident.to_string() == kw,
            _ => false,
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.ts.pop() {
            Some(TokenTree::Ident(ident)) => Ok(ident.to_string()),
            Some(other) => bail!("expected an identifier, got `{other}`"),
            None => bail!("expected an identifier"),
        }
    }

    fn expect_punct(&mut self, punct: char) -> Result<()> {
        if !self.eat_punct(punct) {
            bail!("expected `{punct}`")
        }
        Ok(())
    }
    fn eat_punct(&mut self, punct: char) -> bool {
        match self.ts.last() {
            Some(TokenTree::Punct(p)) if p.as_char() == punct => {
                self.ts.pop();
                true
            }
            _ => false,
        }
    }
    fn lookahead_punct(&self, punct: char, n: usize) -> bool {
        match self.ts.iter().rev().nth(n) {
            Some(TokenTree::Punct(p)) => p.as_char() == punct,
            _ => false,
        }
    }

    fn expect_string(&mut self) -> Result<String> {
        match self.eat_string() {
            Some(it) => Ok(it),
            None => bail!("expected a string"),
        }
    }
    fn eat_string(&mut self) -> Option<String> {
        match self.ts.last() {
            Some(TokenTree::Literal(lit)) => {
                let text = lit.to_string();
                if !(text.starts_with('"') || text.starts_with("r\"") || text.starts_with("r#")) {
                    return None;
                }
                self.ts.pop();
                Some(str_lit_value(&text))
            }
            _ => None,
        }
    }

    /// Tokens up to the next top level `,`, as source text.
    fn until_comma(&mut self) -> Result<String> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        let mut arrow = false;
        while let Some(tt) = self.ts.last() {
            match tt {
                TokenTree::Punct(p) => {
                    let c = p.as_char();
                    if c == ',' && depth == 0 {
                        break;
                    }
                    match c {
                        '<' => depth += 1,
                        '>' if !arrow => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                    arrow = c == '-' && p.spacing() == Spacing::Joint;
                }
                _ => arrow = false,
            }
            tokens.extend(self.ts.pop());
        }
        if tokens.is_empty() {
            bail!("expected a type or an expression")
        }
        Ok(tokens.into_iter().collect::<TokenStream>().to_string())
    }
}

fn open(delimiter: Delimiter) -> &'static str {
    match delimiter {
        Delimiter::Parenthesis => "(",
        Delimiter::Brace => "{",
        Delimiter::Bracket => "[",
        Delimiter::None => "group",
    }
}

/// The value of a string literal token.
fn str_lit_value(lit: &str) -> String {
    if let Some(raw) = lit.strip_prefix('r') {
        return raw.trim_matches('#').trim_matches('"').to_string();
    }
    let body = lit.strip_prefix('"').and_then(|it| it.strip_suffix('"')).unwrap_or(lit);
    let mut res = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            res.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => res.push('\n'),
            Some('t') => res.push('\t'),
            Some('r') => res.push('\r'),
            Some('0') => res.push('\0'),
            Some('\n') => {
                while chars.clone().next().is_some_and(char::is_whitespace) {
                    chars.next();
                }
            }
            Some('x') => {
                let hex = chars.by_ref().take(2).collect::<String>();
                res.extend(u8::from_str_radix(&hex, 16).ok().map(char::from));
            }
            Some('u') => {
                let hex = chars
                    .by_ref()
                    .take_while(|&it| it != '}')
                    .filter(|&it| it != '{' && it != '_')
                    .collect::<String>();
                res.extend(u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32));
            }
            Some(other) => res.push(other),
            None => res.push('\\'),
        }
    }
    res
}
