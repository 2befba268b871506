//! An INI-file grammar exercising the find/discard scanning operations:
//! sections, properties, and discarded comments.

use std::fmt;
use std::io;

use lexweave_common::{CancelToken, Error, Position, Token, TokenType};
use lexweave_lexer::{lex_fn, LexContext, Lexer, NextLex, RuneCursor};
use lexweave_parser::{parse_fn, ParseContext, Tree};
use lexweave_pipeline::lex_parse;

const IDENT: TokenType = TokenType(0);
const OPER: TokenType = TokenType(1);
const VALUE: TokenType = TokenType(2);
const COMMENT: TokenType = TokenType(3);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum IniValue {
    #[default]
    Root,
    /// A section header; the global section has an empty name.
    Section(String),
    Property {
        name: String,
        value: String,
    },
}

impl fmt::Display for IniValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IniValue::Root => write!(f, "root"),
            IniValue::Section(name) => write!(f, "[{name}]"),
            IniValue::Property { name, value } => write!(f, "{name} = {value}"),
        }
    }
}

// ---- Lexer states ----

/// Top-level dispatch: whitespace is discarded, everything else is routed.
fn lex_ini(ctx: &mut LexContext) -> Result<NextLex, Error> {
    loop {
        match ctx.peek() {
            Some(' ' | '\t' | '\r' | '\n') => {
                ctx.discard();
            }
            Some('[' | ']' | '=') => return Ok(Some(lex_fn(lex_oper))),
            Some(';' | '#') => return Ok(Some(lex_fn(lex_comment))),
            Some(_) => return Ok(Some(lex_fn(lex_ident))),
            None => return Err(Error::EndOfInput),
        }
    }
}

/// Lexes a single operator rune.
fn lex_oper(ctx: &mut LexContext) -> Result<NextLex, Error> {
    let oper = ctx.next_rune();
    ctx.emit(OPER);
    if oper == Some('=') {
        return Ok(Some(lex_fn(lex_value)));
    }
    Ok(Some(lex_fn(lex_ini)))
}

/// Lexes an identifier (section name or property key).
fn lex_ident(ctx: &mut LexContext) -> Result<NextLex, Error> {
    if !ctx.find(&["]", "="]).is_empty() {
        ctx.emit(IDENT);
        return Ok(Some(lex_fn(lex_oper)));
    }
    Err(Error::UnexpectedEof("looking for \"]\" or \"=\"".to_string()))
}

/// Lexes a property value, up to a comment or end of line.
fn lex_value(ctx: &mut LexContext) -> Result<NextLex, Error> {
    ctx.find(&[";", "\n"]);
    ctx.emit(VALUE);
    Ok(Some(lex_fn(lex_ini)))
}

/// Lexes a comment, up to end of line.
fn lex_comment(ctx: &mut LexContext) -> Result<NextLex, Error> {
    ctx.find(&["\n"]);
    ctx.emit(COMMENT);
    Ok(Some(lex_fn(lex_ini)))
}

// ---- Parser states ----

fn ini_err(message: &str, token: &Token) -> Error {
    Error::Parse {
        message: format!("{message}: {:?}", token.value),
        position: token.start.clone(),
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Replaces the root and opens the unnamed global section.
fn parse_init(ctx: &mut ParseContext<IniValue>) -> Result<(), Error> {
    ctx.replace(IniValue::Root);
    ctx.push(IniValue::Section(String::new()));
    ctx.push_state([parse_fn(parse_ini)]);
    Ok(())
}

/// Top-level dispatch on the next token.
fn parse_ini(ctx: &mut ParseContext<IniValue>) -> Result<(), Error> {
    let token = ctx.peek();
    match token.kind {
        OPER => ctx.push_state([parse_fn(parse_section)]),
        IDENT => ctx.push_state([parse_fn(parse_property)]),
        COMMENT => {
            ctx.next();
            ctx.push_state([parse_fn(parse_ini)]);
        }
        TokenType::EOF => {}
        _ => return Err(ini_err("unexpected token", &token)),
    }
    Ok(())
}

/// Parses `[name]`, opening a new section under the root.
fn parse_section(ctx: &mut ParseContext<IniValue>) -> Result<(), Error> {
    let open = ctx.next();
    if open.kind != OPER || open.value != "[" {
        return Err(ini_err("expected \"[\"", &open));
    }

    let name_token = ctx.next();
    if name_token.kind != IDENT {
        return Err(ini_err("expected a section name", &name_token));
    }
    let name = name_token.value.trim().to_string();
    if !valid_name(&name) {
        return Err(ini_err("invalid section name", &name_token));
    }

    // The section node is created while the name token is the last one
    // consumed, so it carries the name's position.
    ctx.climb();
    ctx.push(IniValue::Section(name));

    let close = ctx.next();
    if close.kind != OPER || close.value != "]" {
        return Err(ini_err("expected \"]\"", &close));
    }

    ctx.push_state([parse_fn(parse_ini)]);
    Ok(())
}

/// Parses `key = value` into the current section.
fn parse_property(ctx: &mut ParseContext<IniValue>) -> Result<(), Error> {
    let key_token = ctx.next();
    if key_token.kind != IDENT {
        return Err(ini_err("expected a property name", &key_token));
    }
    let name = key_token.value.trim().to_string();
    if !valid_name(&name) {
        return Err(ini_err("invalid property name", &key_token));
    }

    let eq = ctx.next();
    if eq.kind != OPER || eq.value != "=" {
        return Err(ini_err("expected \"=\"", &eq));
    }

    let value_token = ctx.next();
    if value_token.kind != VALUE {
        return Err(ini_err("expected a property value", &value_token));
    }

    ctx.add_node(IniValue::Property {
        name,
        value: value_token.value.trim().to_string(),
    });

    ctx.push_state([parse_fn(parse_ini)]);
    Ok(())
}

// ---- Tests ----

fn parse(input: &str) -> (Tree<IniValue>, Option<Error>) {
    let cancel = CancelToken::new();
    let lexer = Lexer::new(
        RuneCursor::new(io::Cursor::new(input.to_string())),
        lex_fn(lex_ini),
    );
    lex_parse(&cancel, lexer, parse_fn(parse_init))
}

#[test]
fn test_section_with_property() {
    let (tree, err) = parse("[sec]\nk = v\n");
    assert!(err.is_none());

    let root = tree.node(tree.root());
    assert_eq!(*root.value(), IniValue::Root);
    // The global section plus "sec".
    assert_eq!(root.children().len(), 2);

    let section = tree.node(root.children()[1]);
    assert_eq!(*section.value(), IniValue::Section("sec".to_string()));
    // The section node sits at the section name token.
    assert_eq!(*section.start(), Position::at(1, 2, 1));

    assert_eq!(section.children().len(), 1);
    let property = tree.node(section.children()[0]);
    assert_eq!(
        *property.value(),
        IniValue::Property {
            name: "k".to_string(),
            value: "v".to_string(),
        }
    );
}

#[test]
fn test_global_properties() {
    let (tree, err) = parse("a = 1\nb = 2\n");
    assert!(err.is_none());

    let root = tree.node(tree.root());
    assert_eq!(root.children().len(), 1);
    let global = tree.node(root.children()[0]);
    assert_eq!(*global.value(), IniValue::Section(String::new()));
    assert_eq!(global.children().len(), 2);
}

#[test]
fn test_comments_are_discarded() {
    let (tree, err) = parse("; a comment\n[s]\n# another\nk = v\n");
    assert!(err.is_none());
    let root = tree.node(tree.root());
    assert_eq!(root.children().len(), 2);
    let section = tree.node(root.children()[1]);
    assert_eq!(section.children().len(), 1);
}

#[test]
fn test_ini_tree_output() {
    let input = "\
; last modified 1 April 2001 by John Doe
[owner]
name = John Doe
organization = Acme Widgets Inc.

[database]
; use IP address in case network name resolution is not working
server = 192.0.2.62
port = 143
file = \"payroll.dat\"
";
    let (tree, err) = parse(input);
    assert!(err.is_none());

    let expected = "\
root (1:1)
├── [] (1:1)
├── [owner] (2:2)
│   ├── name = John Doe (3:7)
│   └── organization = Acme Widgets Inc. (4:15)
└── [database] (6:2)
    ├── server = 192.0.2.62 (8:9)
    ├── port = 143 (9:7)
    └── file = \"payroll.dat\" (10:7)
";
    assert_eq!(tree.to_string(), expected);
}

#[test]
fn test_invalid_section_name() {
    let (_, err) = parse("[bad name]\n");
    match err {
        Some(Error::Parse { message, .. }) => {
            assert!(message.contains("invalid section name"), "message: {message}");
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_unterminated_section_header() {
    let (_, err) = parse("[sec");
    assert!(err.is_some());
}

#[test]
fn test_value_ends_at_comment() {
    let (tree, err) = parse("k = v ; trailing\n");
    assert!(err.is_none());
    let root = tree.node(tree.root());
    let global = tree.node(root.children()[0]);
    let property = tree.node(global.children()[0]);
    assert_eq!(
        *property.value(),
        IniValue::Property {
            name: "k".to_string(),
            value: "v".to_string(),
        }
    );
}
