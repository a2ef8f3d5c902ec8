use std::collections::HashMap;
use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not},
    character::complete::char,
    combinator::value,
    IResult,
};
use serde::Serialize;

/// Kinds of node the action interpreter can open.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Rift,
    Block,
    FunctionDefinition,
    FunctionApply,
    Arguments,
    Tuple,
    List,
    Map,
    MapEntry,
    Assignment,
    If,
    String,
    Numeric,
    Boolean,
    Reference,
    Operation,
    BinaryOperator,
}

// Parsed source: the rifts in the order they were written
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Source {
    pub rifts: Vec<Rift>,
}

impl Source {
    pub fn new(rifts: Vec<Rift>) -> Self {
        Self { rifts }
    }

    pub fn rifts(&self) -> &[Rift] {
        &self.rifts
    }

    /// Looks a rift up by its name without the gravity marker.
    pub fn rift(&self, name: &str) -> Option<&Rift> {
        self.rifts.iter().find(|rift| rift.name() == name)
    }

    pub fn len(&self) -> usize {
        self.rifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rifts.is_empty()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rift) in self.rifts.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", rift)?;
        }
        Ok(())
    }
}

/// A top-level `name => { ... }` unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rift {
    pub name: Ref,
    pub lines: Vec<Node>,
}

impl Rift {
    pub fn raw_name(&self) -> &str {
        self.name.raw_name()
    }

    pub fn name(&self) -> &str {
        self.name.name()
    }

    /// A leading `@` makes the rift visible to other units.
    pub fn has_gravity(&self) -> bool {
        self.name.has_gravity()
    }

    pub fn lines(&self) -> &[Node] {
        &self.lines
    }

    /// Functions assigned at the top of the rift, by name.
    pub fn protocol(&self) -> HashMap<&str, &Func> {
        self.lines
            .iter()
            .filter_map(Node::as_assignment)
            .filter_map(|assignment| {
                assignment
                    .value
                    .as_func()
                    .map(|func| (assignment.target.name(), func))
            })
            .collect()
    }
}

impl fmt::Display for Rift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} ", NodeKind::Rift, self.name)?;
        write_block(f, &self.lines)?;
        write!(f, ")")
    }
}

/// A name, optionally scoped to another unit (`unit:name`).
///
/// Components keep their `@` prefix as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Ref {
    pub unit: Option<String>,
    pub local: String,
}

impl Ref {
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            unit: None,
            local: name.into(),
        }
    }

    pub fn qualified(unit: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            unit: Some(unit.into()),
            local: name.into(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.unit.is_none()
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// The unit the name resolves in; `_` is the current one.
    pub fn rift(&self) -> &str {
        self.unit.as_deref().unwrap_or("_")
    }

    pub fn raw_name(&self) -> &str {
        &self.local
    }

    pub fn name(&self) -> &str {
        self.local.strip_prefix('@').unwrap_or(&self.local)
    }

    /// Gravity is carried by the first component.
    pub fn has_gravity(&self) -> bool {
        self.unit.as_deref().unwrap_or(&self.local).starts_with('@')
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "({} {}:{})", NodeKind::Reference, unit, self.local),
            None => write!(f, "({} {})", NodeKind::Reference, self.local),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Node {
    FunctionDefinition(Func),
    FunctionApply(FuncApply),
    Tuple(Vec<Node>),
    List(Vec<Node>),
    Map(Vec<MapEntry>),
    Assignment(Assignment),
    If(If),
    String(String),
    Numeric(Numeric),
    Boolean(bool),
    Reference(Ref),
    Operation(Operation),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::FunctionDefinition(_) => NodeKind::FunctionDefinition,
            Node::FunctionApply(_) => NodeKind::FunctionApply,
            Node::Tuple(_) => NodeKind::Tuple,
            Node::List(_) => NodeKind::List,
            Node::Map(_) => NodeKind::Map,
            Node::Assignment(_) => NodeKind::Assignment,
            Node::If(_) => NodeKind::If,
            Node::String(_) => NodeKind::String,
            Node::Numeric(_) => NodeKind::Numeric,
            Node::Boolean(_) => NodeKind::Boolean,
            Node::Reference(_) => NodeKind::Reference,
            Node::Operation(_) => NodeKind::Operation,
        }
    }

    pub fn as_ref_node(&self) -> Option<&Ref> {
        match self {
            Node::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    pub fn as_assignment(&self) -> Option<&Assignment> {
        match self {
            Node::Assignment(assignment) => Some(assignment),
            _ => None,
        }
    }

    pub fn as_func_apply(&self) -> Option<&FuncApply> {
        match self {
            Node::FunctionApply(apply) => Some(apply),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<&Func> {
        match self {
            Node::FunctionDefinition(func) => Some(func),
            _ => None,
        }
    }

    pub fn as_if(&self) -> Option<&If> {
        match self {
            Node::If(statement) => Some(statement),
            _ => None,
        }
    }

    pub fn as_operation(&self) -> Option<&Operation> {
        match self {
            Node::Operation(operation) => Some(operation),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::FunctionDefinition(func) => write!(f, "{}", func),
            Node::FunctionApply(apply) => write!(f, "{}", apply),
            Node::Tuple(values) => write_list(f, NodeKind::Tuple, values),
            Node::List(values) => write_list(f, NodeKind::List, values),
            Node::Map(entries) => write_list(f, NodeKind::Map, entries),
            Node::Assignment(assignment) => write!(f, "{}", assignment),
            Node::If(statement) => write!(f, "{}", statement),
            Node::String(text) => write!(f, "({} {:?})", NodeKind::String, text),
            Node::Numeric(number) => write!(f, "({} {})", NodeKind::Numeric, number),
            Node::Boolean(flag) => write!(f, "({} {})", NodeKind::Boolean, flag),
            Node::Reference(reference) => write!(f, "{}", reference),
            Node::Operation(operation) => write!(f, "{}", operation),
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, kind: NodeKind, items: &[T]) -> fmt::Result {
    write!(f, "({}", kind)?;
    for item in items {
        write!(f, " {}", item)?;
    }
    write!(f, ")")
}

fn write_block(f: &mut fmt::Formatter<'_>, lines: &[Node]) -> fmt::Result {
    write_list(f, NodeKind::Block, lines)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Numeric {
    Integer(i64),
    Decimal(f64),
    Scientific(f64),
}

impl Numeric {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Numeric::Integer(value) => value as f64,
            Numeric::Decimal(value) | Numeric::Scientific(value) => value,
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Integer(value) => write!(f, "{}", value),
            Numeric::Decimal(value) | Numeric::Scientific(value) => write!(f, "{:?}", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapEntry {
    pub key: Node,
    pub value: Node,
}

impl fmt::Display for MapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", NodeKind::MapEntry, self.key, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub target: Ref,
    pub value: Box<Node>,
}

impl Assignment {
    pub fn target(&self) -> &Ref {
        &self.target
    }

    pub fn value(&self) -> &Node {
        &self.value
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", NodeKind::Assignment, self.target, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncApply {
    pub callee: Ref,
    pub args: Vec<Node>,
}

impl FuncApply {
    pub fn callee(&self) -> &Ref {
        &self.callee
    }

    pub fn args(&self) -> &[Node] {
        &self.args
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

impl fmt::Display for FuncApply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} ", NodeKind::FunctionApply, self.callee)?;
        write_list(f, NodeKind::Tuple, &self.args)?;
        write!(f, ")")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Body {
    Block(Vec<Node>),
    Expr(Box<Node>),
}

/// A function literal, `(params) -> body`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Func {
    pub params: Vec<Ref>,
    pub body: Body,
}

impl Func {
    pub fn params(&self) -> &[Ref] {
        &self.params
    }

    /// A single-expression body counts as one line.
    pub fn lines(&self) -> &[Node] {
        match &self.body {
            Body::Block(lines) => lines,
            Body::Expr(expr) => std::slice::from_ref(&**expr),
        }
    }
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} ", NodeKind::FunctionDefinition)?;
        write_list(f, NodeKind::Arguments, &self.params)?;
        match &self.body {
            Body::Block(lines) => {
                write!(f, " ")?;
                write_block(f, lines)?;
            }
            Body::Expr(expr) => write!(f, " {}", expr)?,
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct If {
    pub condition: Box<Node>,
    pub lines: Vec<Node>,
    pub else_lines: Option<Vec<Node>>,
}

impl If {
    pub fn condition(&self) -> &Node {
        &self.condition
    }

    pub fn lines(&self) -> &[Node] {
        &self.lines
    }

    /// Empty when there is no `else` block.
    pub fn else_lines(&self) -> &[Node] {
        self.else_lines.as_deref().unwrap_or(&[])
    }

    pub fn has_else(&self) -> bool {
        self.else_lines.is_some()
    }
}

impl fmt::Display for If {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} ", NodeKind::If, self.condition)?;
        write_block(f, &self.lines)?;
        if let Some(else_lines) = &self.else_lines {
            write!(f, " ")?;
            write_block(f, else_lines)?;
        }
        write!(f, ")")
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum BinaryOperator {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "%")]
    Modulo,
    #[strum(serialize = "**")]
    Power,
}

/// A flat operator chain, read left to right without precedence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    pub first: Box<Node>,
    pub rest: Vec<(BinaryOperator, Node)>,
}

impl Operation {
    pub fn operands(&self) -> Vec<&Node> {
        std::iter::once(self.first.as_ref())
            .chain(self.rest.iter().map(|(_, operand)| operand))
            .collect()
    }

    pub fn operators(&self) -> Vec<BinaryOperator> {
        self.rest.iter().map(|(operator, _)| *operator).collect()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {}", NodeKind::Operation, self.first)?;
        for (operator, operand) in &self.rest {
            write!(f, " {} {}", operator, operand)?;
        }
        write!(f, ")")
    }
}

/// Decodes the escapes of a string literal body. Returns `None` on an escape
/// the language does not define.
#[tracing::instrument(level = "trace")]
pub fn unescape(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return Some(String::new());
    }
    let result: IResult<&str, String> = escaped_transform(
        is_not("\\"),
        '\\',
        alt((
            value("\n", char('n')),
            value("\t", char('t')),
            value("\r", char('r')),
            value("\u{c}", char('f')),
            value("\u{8}", char('b')),
            value("\u{7}", char('a')),
            value("\u{b}", char('v')),
            value("\\", char('\\')),
            value("?", char('?')),
            value("\"", char('"')),
            value("'", char('\'')),
        )),
    )(raw);
    match result {
        Ok(("", decoded)) => Some(decoded),
        _ => None,
    }
}
