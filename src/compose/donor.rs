//! Structured intermediate form of a donor component source.
//!
//! Donor sources are written against a generic vehicle entity. Parsing keeps
//! the includes and the module functions; each function body line becomes a
//! [`Statement`] so slot indices and accessors can be rewritten without text
//! substitution.

use super::render::TargetEntity;
use crate::error::CompositionError;
use crate::types::LifecyclePhase;
use std::path::{Path, PathBuf};

/// Getter accessors that read a slot
pub const GETTERS: &[&str] = &["real", "integer", "vec", "mat"];

/// A parsed donor component source
#[derive(Debug, Clone, PartialEq)]
pub struct DonorSource {
    pub component: String,
    pub path: PathBuf,
    pub includes: Vec<String>,
    pub functions: Vec<DonorFunction>,
}

/// One module function of a donor
#[derive(Debug, Clone, PartialEq)]
pub struct DonorFunction {
    pub return_type: String,
    pub name: String,
    pub params: String,
    pub body: Vec<Line>,
}

/// A body line: leading whitespace plus statement
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub indent: String,
    pub stmt: Statement,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `<array>[i].init("name", ...);`
    Declare(SlotDecl),
    /// `[type] x=<array>[i].<getter>();`
    Load(SlotLoad),
    /// `<array>[i].<setter>(x);`
    Store(SlotStore),
    /// Anything else, with embedded slot and class references
    Code(Vec<Segment>),
    Blank,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotDecl {
    pub index: usize,
    pub name: String,
    /// Raw arguments following the slot name
    pub args: String,
    /// Component that declared the slot
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotLoad {
    pub ty: Option<String>,
    pub target: String,
    pub index: usize,
    pub getter: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotStore {
    pub index: usize,
    pub setter: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    SlotRef(usize),
    ClassRef,
}

impl Line {
    pub fn new(indent: impl Into<String>, stmt: Statement) -> Self {
        Self {
            indent: indent.into(),
            stmt,
        }
    }

    pub fn code(indent: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(indent, Statement::Code(vec![Segment::Text(text.into())]))
    }

    pub fn blank() -> Self {
        Self::new("", Statement::Blank)
    }
}

impl DonorFunction {
    pub fn phase(&self) -> LifecyclePhase {
        LifecyclePhase::from_function_name(&self.name)
    }

    pub fn declarations(&self) -> impl Iterator<Item = &SlotDecl> {
        self.body.iter().filter_map(|l| match &l.stmt {
            Statement::Declare(d) => Some(d),
            _ => None,
        })
    }

    pub fn loads(&self) -> impl Iterator<Item = &SlotLoad> {
        self.body.iter().filter_map(|l| match &l.stmt {
            Statement::Load(x) => Some(x),
            _ => None,
        })
    }
}

impl DonorSource {
    pub fn function(&self, phase: LifecyclePhase) -> Option<&DonorFunction> {
        self.functions.iter().find(|f| f.phase() == phase)
    }

    pub fn declarations(&self) -> impl Iterator<Item = &SlotDecl> {
        self.functions.iter().flat_map(|f| f.declarations())
    }

    pub fn declaration(&self, name: &str) -> Option<&SlotDecl> {
        self.declarations().find(|d| d.name == name)
    }

    /// First load into a local named `name`
    pub fn load(&self, name: &str) -> Option<&SlotLoad> {
        self.functions
            .iter()
            .flat_map(|f| f.loads())
            .find(|l| l.target == name)
    }

    /// Read a donor source from disk
    pub fn from_file(
        component: &str,
        path: &Path,
        entity: &TargetEntity,
    ) -> Result<Self, CompositionError> {
        let text = std::fs::read_to_string(path).map_err(|e| CompositionError::DonorParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        parse_donor(component, path, &text, entity)
    }
}

enum State {
    Outside,
    /// Header text collected so far and the line it started on
    Signature(String, usize),
    Header(FunctionHeader),
    Body(FunctionHeader, Vec<Line>, i32),
}

struct FunctionHeader {
    return_type: String,
    name: String,
    params: String,
}

/// Parse donor text written against `entity.generic_class` / `entity.generic_array`
pub fn parse_donor(
    component: &str,
    path: &Path,
    text: &str,
    entity: &TargetEntity,
) -> Result<DonorSource, CompositionError> {
    let err = |message: String| CompositionError::DonorParse {
        path: path.to_path_buf(),
        message,
    };
    let qualifier = format!("{}::", entity.generic_class);

    let mut includes = Vec::new();
    let mut functions = Vec::new();
    let mut state = State::Outside;

    for (lineno, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        state = match state {
            State::Outside => {
                if trimmed.starts_with("#include") {
                    includes.push(trimmed.to_string());
                    State::Outside
                } else if is_comment(trimmed) || !trimmed.contains(qualifier.as_str()) {
                    State::Outside
                } else if trimmed.contains('(') && !trimmed.contains(')') {
                    State::Signature(trimmed.to_string(), lineno)
                } else {
                    open_function(trimmed, &qualifier)
                        .map_err(|m| err(format!("line {}: {}", lineno + 1, m)))?
                }
            }
            State::Signature(mut signature, start) => {
                signature.push(' ');
                signature.push_str(trimmed);
                if trimmed.contains(')') {
                    open_function(&signature, &qualifier)
                        .map_err(|m| err(format!("line {}: {}", start + 1, m)))?
                } else {
                    State::Signature(signature, start)
                }
            }
            State::Header(header) => {
                if trimmed == "{" {
                    State::Body(header, Vec::new(), 1)
                } else if trimmed.is_empty() || trimmed.starts_with("//") {
                    State::Header(header)
                } else {
                    return Err(err(format!(
                        "line {}: expected '{{' after {}",
                        lineno + 1,
                        header.name
                    )));
                }
            }
            State::Body(header, mut body, depth) => {
                let depth = depth + brace_delta(raw);
                if depth <= 0 {
                    functions.push(DonorFunction {
                        return_type: header.return_type,
                        name: header.name,
                        params: header.params,
                        body,
                    });
                    State::Outside
                } else {
                    body.push(parse_line(raw, component, entity));
                    State::Body(header, body, depth)
                }
            }
        };
    }

    match state {
        State::Outside => {}
        State::Signature(_, start) => {
            return Err(err(format!("line {}: unterminated function signature", start + 1)));
        }
        State::Header(h) | State::Body(h, _, _) => {
            return Err(err(format!("unterminated function {}", h.name)));
        }
    }
    if functions.is_empty() {
        return Err(err(format!("no {} functions found", qualifier)));
    }

    Ok(DonorSource {
        component: component.to_string(),
        path: path.to_path_buf(),
        includes,
        functions,
    })
}

fn is_comment(line: &str) -> bool {
    line.starts_with("//") || line.starts_with("/*") || line.starts_with('*')
}

/// State after a complete line naming the qualifier
///
/// Declarations ending in `;` stay outside; anything else must be a
/// function header.
fn open_function(signature: &str, qualifier: &str) -> Result<State, String> {
    if signature.ends_with(';') {
        return Ok(State::Outside);
    }
    let header = parse_header(signature, qualifier)
        .ok_or_else(|| format!("unrecognized function header '{}'", signature))?;
    Ok(if signature.ends_with('{') {
        State::Body(header, Vec::new(), 1)
    } else {
        State::Header(header)
    })
}

/// `void Vehicle::forces(double int_step)` -> header parts
fn parse_header(line: &str, qualifier: &str) -> Option<FunctionHeader> {
    if is_comment(line) || line.ends_with(';') {
        return None;
    }
    let (before, after) = line.split_once(qualifier)?;
    let return_type = before.trim();
    if return_type.is_empty() || return_type.contains(['=', '(']) {
        return None;
    }
    let open = after.find('(')?;
    let close = after.rfind(')')?;
    let name = after[..open].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some(FunctionHeader {
        return_type: return_type.to_string(),
        name: name.to_string(),
        params: after[open + 1..close].trim().to_string(),
    })
}

/// Net brace depth change, ignoring braces in comments and literals
fn brace_delta(line: &str) -> i32 {
    let mut delta = 0;
    let mut chars = line.chars().peekable();
    let mut in_str: Option<char> = None;
    while let Some(c) = chars.next() {
        match in_str {
            Some(q) => {
                if c == '\\' {
                    chars.next();
                } else if c == q {
                    in_str = None;
                }
            }
            None => match c {
                '"' | '\'' => in_str = Some(c),
                '/' if chars.peek() == Some(&'/') => break,
                '{' => delta += 1,
                '}' => delta -= 1,
                _ => {}
            },
        }
    }
    delta
}

/// Classify one body line
pub fn parse_line(raw: &str, owner: &str, entity: &TargetEntity) -> Line {
    let trimmed_start = raw.trim_start();
    let indent = raw[..raw.len() - trimmed_start.len()].to_string();
    let text = trimmed_start.trim_end();
    let stmt = if text.is_empty() {
        Statement::Blank
    } else {
        parse_statement(text, owner, &entity.generic_array)
            .unwrap_or_else(|| Statement::Code(segment(text, entity)))
    };
    Line { indent, stmt }
}

fn parse_statement(text: &str, owner: &str, array: &str) -> Option<Statement> {
    if text.starts_with("//") {
        return None;
    }
    if let Some((index, rest)) = slot_prefix(text, array) {
        let rest = rest.strip_prefix('.')?;
        let (method, args) = rest.split_once('(')?;
        let args = args.strip_suffix(");")?;
        if method == "init" {
            let args = args.trim_start().strip_prefix('"')?;
            let (name, rest) = args.split_once('"')?;
            let rest = rest.trim_start().strip_prefix(',')?;
            return Some(Statement::Declare(SlotDecl {
                index,
                name: name.to_string(),
                args: rest.to_string(),
                owner: owner.to_string(),
            }));
        }
        if method.starts_with("gets") && is_ident(method) {
            return Some(Statement::Store(SlotStore {
                index,
                setter: method.to_string(),
                value: args.trim().to_string(),
            }));
        }
        return None;
    }

    let (lhs, rhs) = text.split_once('=')?;
    let rhs = rhs.trim();
    let (index, rest) = slot_prefix(rhs, array)?;
    let getter = rest.strip_prefix('.')?.strip_suffix("();")?;
    if !GETTERS.contains(&getter) {
        return None;
    }
    let lhs = lhs.trim();
    let (ty, target) = match lhs.rsplit_once(char::is_whitespace) {
        Some((ty, target)) if is_ident(ty.trim()) => (Some(ty.trim().to_string()), target),
        Some(_) => return None,
        None => (None, lhs),
    };
    if target.is_empty() || target.contains(['(', '+', '-', '*', '/', '<', '>', '!']) {
        return None;
    }
    Some(Statement::Load(SlotLoad {
        ty,
        target: target.to_string(),
        index,
        getter: getter.to_string(),
    }))
}

/// `vehicle[12]...` -> (12, "...")
fn slot_prefix<'a>(text: &'a str, array: &str) -> Option<(usize, &'a str)> {
    let rest = text.strip_prefix(array)?.strip_prefix('[')?;
    let close = rest.find(']')?;
    let index = rest[..close].trim().parse().ok()?;
    Some((index, &rest[close + 1..]))
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !s.starts_with(|c: char| c.is_ascii_digit())
}

/// Split free-form code into text, slot references and class references
pub fn segment(text: &str, entity: &TargetEntity) -> Vec<Segment> {
    let array_open = format!("{}[", entity.generic_array);
    let qualifier = format!("{}::", entity.generic_class);
    let mut segments = Vec::new();
    let mut buf = String::new();
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        let boundary = text[..i]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
        if boundary && rest.starts_with(&array_open) {
            if let Some((index, _)) = slot_prefix(rest, &entity.generic_array) {
                let consumed = rest.find(']').map_or(rest.len(), |p| p + 1);
                if !buf.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut buf)));
                }
                segments.push(Segment::SlotRef(index));
                i += consumed;
                continue;
            }
        }
        if boundary && rest.starts_with(&qualifier) {
            if !buf.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut buf)));
            }
            segments.push(Segment::ClassRef);
            i += qualifier.len();
            continue;
        }
        let ch = rest.chars().next().unwrap_or_default();
        buf.push(ch);
        i += ch.len_utf8().max(1);
    }
    if !buf.is_empty() {
        segments.push(Segment::Text(buf));
    }
    segments
}
