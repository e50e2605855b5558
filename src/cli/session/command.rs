//! Shell command parsing.

use std::str::FromStr;

use crate::core::constants::{DEFAULT_GENERATED_LEN, DEFAULT_HISTORY_LIMIT};
use crate::core::types::{CategoryId, RecordId};

/// One line typed at the `latchkey>` prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List {
        search: Option<String>,
        category: Option<CategoryId>,
    },
    Show(RecordId),
    Copy(RecordId),
    Add,
    Edit(RecordId),
    Rm(RecordId),
    Generate {
        length: u32,
        symbols: bool,
    },
    Categories,
    CategoryAdd,
    CategoryEdit(CategoryId),
    CategoryRm(CategoryId),
    History {
        limit: u32,
    },
    Logout,
    Help,
    Quit,
    Nothing,
}

pub const HELP: &[(&str, &str)] = &[
    ("list [text] [-c ID]", "list records, optionally filtered"),
    ("show ID", "show a record (without its password)"),
    ("copy ID", "copy a password to the clipboard"),
    ("add", "add a record"),
    ("edit ID", "edit a record"),
    ("rm ID", "delete a record"),
    ("generate [LEN] [--no-symbols]", "generate a random password"),
    ("categories", "list categories"),
    ("category add|edit ID|rm ID", "manage categories"),
    ("history [LIMIT]", "show recent activity"),
    ("logout", "lock the vault"),
    ("help", "show this help"),
    ("quit", "leave the shell"),
];

fn id<T: FromStr>(arg: Option<&str>, what: &str) -> Result<T, String> {
    let raw = arg.ok_or_else(|| format!("missing {what} id"))?;
    raw.trim_start_matches('#')
        .parse()
        .map_err(|_| format!("invalid {what} id: {raw}"))
}

fn number(raw: &str, what: &str) -> Result<u32, String> {
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("invalid {what}: {raw}")),
    }
}

fn parse_list(args: &[&str]) -> Result<Action, String> {
    let mut words = Vec::new();
    let mut category = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            "-c" | "--category" => category = Some(id(iter.next().copied(), "category")?),
            word => words.push(word),
        }
    }
    let search = (!words.is_empty()).then(|| words.join(" "));
    Ok(Action::List { search, category })
}

fn parse_generate(args: &[&str]) -> Result<Action, String> {
    let mut length = DEFAULT_GENERATED_LEN;
    let mut symbols = true;
    for arg in args {
        match *arg {
            "--no-symbols" => symbols = false,
            raw => length = number(raw, "length")?,
        }
    }
    Ok(Action::Generate { length, symbols })
}

/// Parse one input line.
pub fn parse(line: &str) -> Result<Action, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = tokens.split_first() else {
        return Ok(Action::Nothing);
    };

    match head {
        "list" | "ls" => parse_list(args),
        "show" => Ok(Action::Show(id(args.first().copied(), "record")?)),
        "copy" | "cp" => Ok(Action::Copy(id(args.first().copied(), "record")?)),
        "add" => Ok(Action::Add),
        "edit" => Ok(Action::Edit(id(args.first().copied(), "record")?)),
        "rm" | "delete" => Ok(Action::Rm(id(args.first().copied(), "record")?)),
        "generate" | "gen" => parse_generate(args),
        "categories" => Ok(Action::Categories),
        "category" => match args.split_first() {
            Some((&"add", _)) => Ok(Action::CategoryAdd),
            Some((&"edit", rest)) => Ok(Action::CategoryEdit(id(rest.first().copied(), "category")?)),
            Some((&"rm", rest)) => Ok(Action::CategoryRm(id(rest.first().copied(), "category")?)),
            Some((other, _)) => Err(format!("unknown category action: {other}")),
            None => Ok(Action::Categories),
        },
        "history" => match args.first() {
            Some(raw) => Ok(Action::History {
                limit: number(raw, "limit")?,
            }),
            None => Ok(Action::History {
                limit: DEFAULT_HISTORY_LIMIT,
            }),
        },
        "logout" | "lock" => Ok(Action::Logout),
        "help" | "?" => Ok(Action::Help),
        "quit" | "exit" | "q" => Ok(Action::Quit),
        other => Err(format!("unknown command: {other} (try help)")),
    }
}
