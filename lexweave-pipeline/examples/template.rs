//! Minimal template engine built on the pipeline: replaces `{{ var }}`
//! placeholders with values from a data map.
//!
//! Run with `cargo run --example template`.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::process::ExitCode;

use lexweave_common::{CancelToken, Error, TokenType};
use lexweave_lexer::{lex_fn, LexContext, Lexer, NextLex, RuneCursor};
use lexweave_parser::{parse_fn, NodeId, ParseContext, Tree};
use lexweave_pipeline::lex_parse;

const TEXT: TokenType = TokenType(0);
const VAR_START: TokenType = TokenType(1);
const VAR_END: TokenType = TokenType(2);
const IDENT: TokenType = TokenType(3);

#[derive(Debug, Clone, Default)]
enum Value {
    #[default]
    Seq,
    Text(String),
    Var(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Seq => write!(f, "[]"),
            Value::Text(text) => write!(f, "{text:?}"),
            Value::Var(name) => write!(f, "{{{{{name}}}}}"),
        }
    }
}

fn lex_text(ctx: &mut LexContext) -> Result<NextLex, Error> {
    loop {
        let ahead: String = ctx.peek_n(2).into_iter().collect();
        if ahead == "{{" {
            if ctx.width() > 0 {
                ctx.emit(TEXT);
            }
            ctx.advance_n(2);
            ctx.emit(VAR_START);
            return Ok(Some(lex_fn(lex_var)));
        }
        if !ctx.advance() {
            if ctx.width() > 0 {
                ctx.emit(TEXT);
            }
            return Err(Error::EndOfInput);
        }
    }
}

fn lex_var(ctx: &mut LexContext) -> Result<NextLex, Error> {
    while ctx.peek().is_some_and(|c| c.is_whitespace()) {
        ctx.discard();
    }
    while ctx.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
        ctx.advance();
    }
    if ctx.width() == 0 {
        return Err(Error::UnexpectedEof("expected a variable name".to_string()));
    }
    ctx.emit(IDENT);
    while ctx.peek().is_some_and(|c| c.is_whitespace()) {
        ctx.discard();
    }
    let ahead: String = ctx.peek_n(2).into_iter().collect();
    if ahead != "}}" {
        return Err(Error::UnexpectedEof("unclosed variable, expected \"}}\"".to_string()));
    }
    ctx.advance_n(2);
    ctx.emit(VAR_END);
    Ok(Some(lex_fn(lex_text)))
}

fn parse_root(ctx: &mut ParseContext<Value>) -> Result<(), Error> {
    ctx.replace(Value::Seq);
    ctx.push_state([parse_fn(parse_seq)]);
    Ok(())
}

fn parse_seq(ctx: &mut ParseContext<Value>) -> Result<(), Error> {
    let token = ctx.next();
    match token.kind {
        TEXT => {
            ctx.add_node(Value::Text(token.value));
        }
        VAR_START => {
            let name = ctx.next();
            if name.kind != IDENT {
                return Err(Error::Parse {
                    message: format!("expected a variable name, got {name}"),
                    position: name.start,
                });
            }
            ctx.add_node(Value::Var(name.value));
            let close = ctx.next();
            if close.kind != VAR_END {
                return Err(Error::Parse {
                    message: format!("expected \"}}}}\", got {close}"),
                    position: close.start,
                });
            }
        }
        TokenType::EOF => return Ok(()),
        _ => {
            return Err(Error::Parse {
                message: format!("unexpected token {token}"),
                position: token.start,
            })
        }
    }
    ctx.push_state([parse_fn(parse_seq)]);
    Ok(())
}

fn render(tree: &Tree<Value>, id: NodeId, data: &HashMap<&str, &str>, out: &mut String) {
    for &child in tree.node(id).children() {
        match tree.node(child).value() {
            Value::Seq => render(tree, child, data, out),
            Value::Text(text) => out.push_str(text),
            Value::Var(name) => out.push_str(data.get(name.as_str()).copied().unwrap_or("")),
        }
    }
}

fn main() -> ExitCode {
    let input = "Hello, {{ subject }}! Today is {{ day }}.";
    let data = HashMap::from([("subject", "世界"), ("day", "Saturday")]);

    let cancel = CancelToken::new();
    let lexer = Lexer::new(
        RuneCursor::new(io::Cursor::new(input.to_string())),
        lex_fn(lex_text),
    );
    let (tree, err) = lex_parse(&cancel, lexer, parse_fn(parse_root));
    if let Some(err) = err {
        eprintln!("template error: {err}");
        return ExitCode::FAILURE;
    }

    println!("{tree}");
    let mut out = String::new();
    render(&tree, tree.root(), &data, &mut out);
    println!("{out}");
    ExitCode::SUCCESS
}
