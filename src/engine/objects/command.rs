//! The command layer of the resolved tree. Commands nest: a virtual view's
//! definition is itself a command reachable from a procedure block.

use super::{Criteria, ElementRef, Expression, SqlType, Symbol};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Query(Query),
    SetQuery(SetQuery),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    StoredProcedure(StoredProcedureCall),
    Block(ProcedureBlock),
}

/// The subset of commands that produce a relation, usable as a subquery or a
/// set-query branch.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryCommand {
    Query(Query),
    SetQuery(SetQuery),
}

impl QueryCommand {
    /// Declared output type per projected column position.
    pub fn output_types(&self) -> Vec<SqlType> {
        match self {
            QueryCommand::Query(q) => q.select.iter().map(|s| s.expr.ty()).collect(),
            QueryCommand::SetQuery(s) => s.left.output_types(),
        }
    }

    /// Output name per projected column position, drawn from the left-most
    /// branch for set queries.
    pub fn output_names(&self) -> Vec<String> {
        match self {
            QueryCommand::Query(q) => q
                .select
                .iter()
                .enumerate()
                .map(|(i, s)| s.output_name(i))
                .collect(),
            QueryCommand::SetQuery(s) => s.left.output_names(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub distinct: bool,
    pub select: Vec<Symbol>,
    pub from: Vec<FromItem>,
    pub criteria: Option<Criteria>,
    pub group_by: Vec<Expression>,
    pub having: Option<Criteria>,
    pub order_by: Option<OrderBy>,
    pub into: Option<IntoClause>,
}

impl Query {
    pub fn select_from(select: Vec<Symbol>, from: Vec<FromItem>) -> Query {
        Query {
            distinct: false,
            select,
            from,
            criteria: None,
            group_by: vec![],
            having: None,
            order_by: None,
            into: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroupRef {
    pub id: Uuid,
    pub name: String,
}

impl GroupRef {
    pub fn new(id: Uuid, name: &str) -> GroupRef {
        GroupRef {
            id,
            name: name.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FromItem {
    Group(GroupRef),
    Subquery {
        name: String,
        command: Box<QueryCommand>,
    },
    Join(Box<JoinItem>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct JoinItem {
    pub kind: JoinKind,
    pub left: FromItem,
    pub right: FromItem,
    pub on: Option<Criteria>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
}

impl JoinKind {
    /// Whether an always-unknown ON condition behaves as always-false. Inner
    /// and cross join predicates cannot observe the difference.
    pub fn unknown_on_is_false(self) -> bool {
        matches!(self, JoinKind::Inner | JoinKind::Cross)
    }
}

/// SELECT ... INTO a target table.
#[derive(Clone, Debug, PartialEq)]
pub struct IntoClause {
    pub group: GroupRef,
    pub columns: Vec<ElementRef>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SetOperation {
    Union,
    Intersect,
    Except,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetQuery {
    pub op: SetOperation,
    pub all: bool,
    pub left: Box<QueryCommand>,
    pub right: Box<QueryCommand>,
    pub order_by: Option<OrderBy>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderBy {
    pub elements: Vec<OrderByElement>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderByElement {
    pub key: OrderKey,
    pub ascending: bool,
}

/// How an ORDER BY key addresses its target. Canonicalization resolves
/// positions and aliases to the projected symbol they name.
#[derive(Clone, Debug, PartialEq)]
pub enum OrderKey {
    //1-based, as written in SQL
    Position(usize),
    Alias(String),
    Expr(Expression),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Insert {
    pub group: GroupRef,
    pub columns: Vec<ElementRef>,
    pub source: InsertSource,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InsertSource {
    Values(Vec<Expression>),
    Query(Box<QueryCommand>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Update {
    pub group: GroupRef,
    pub changes: Vec<(ElementRef, Expression)>,
    pub criteria: Option<Criteria>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Delete {
    pub group: GroupRef,
    pub criteria: Option<Criteria>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoredProcedureCall {
    pub name: String,
    pub args: Vec<Expression>,
}

/// A sequence of procedural statements, e.g. the generated body of a DML
/// operation against a virtual view.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcedureBlock {
    pub statements: Vec<Statement>,
}

impl ProcedureBlock {
    pub fn new(statements: Vec<Statement>) -> ProcedureBlock {
        ProcedureBlock { statements }
    }

    pub fn empty() -> ProcedureBlock {
        ProcedureBlock { statements: vec![] }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Declare {
        variable: String,
        ty: SqlType,
        value: Option<Expression>,
    },
    Assign {
        variable: String,
        value: Expression,
    },
    If(IfStatement),
    While {
        condition: Criteria,
        block: ProcedureBlock,
    },
    Loop {
        cursor: String,
        query: QueryCommand,
        block: ProcedureBlock,
    },
    Command(Command),
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfStatement {
    pub condition: Criteria,
    pub then_block: ProcedureBlock,
    pub else_block: Option<ProcedureBlock>,
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Command::Query(q) => write!(f, "{}", q),
            Command::SetQuery(s) => write!(f, "{}", s),
            Command::Insert(i) => write!(f, "{}", i),
            Command::Update(u) => write!(f, "{}", u),
            Command::Delete(d) => write!(f, "{}", d),
            Command::StoredProcedure(p) => write!(f, "{}", p),
            Command::Block(b) => write!(f, "{}", b),
        }
    }
}

impl Display for QueryCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            QueryCommand::Query(q) => write!(f, "{}", q),
            QueryCommand::SetQuery(s) => write!(f, "{}", s),
        }
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        for (i, symbol) in self.select.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", symbol)?;
        }
        if let Some(into) = &self.into {
            write!(f, " INTO {}", into.group.name)?;
        }
        if !self.from.is_empty() {
            write!(f, " FROM ")?;
            for (i, item) in self.from.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", item)?;
            }
        }
        if let Some(criteria) = &self.criteria {
            write!(f, " WHERE {}", criteria)?;
        }
        if !self.group_by.is_empty() {
            write!(f, " GROUP BY ")?;
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", expr)?;
            }
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {}", having)?;
        }
        if let Some(order_by) = &self.order_by {
            write!(f, " {}", order_by)?;
        }
        Ok(())
    }
}

impl Display for FromItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FromItem::Group(g) => write!(f, "{}", g.name),
            FromItem::Subquery { name, command } => write!(f, "({}) AS {}", command, name),
            FromItem::Join(j) => write!(f, "{}", j),
        }
    }
}

impl Display for JoinItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::LeftOuter => "LEFT OUTER JOIN",
            JoinKind::RightOuter => "RIGHT OUTER JOIN",
            JoinKind::FullOuter => "FULL OUTER JOIN",
            JoinKind::Cross => "CROSS JOIN",
        };
        write!(f, "{} {} {}", self.left, kind, self.right)?;
        if let Some(on) = &self.on {
            write!(f, " ON {}", on)?;
        }
        Ok(())
    }
}

impl Display for SetQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            SetOperation::Union => "UNION",
            SetOperation::Intersect => "INTERSECT",
            SetOperation::Except => "EXCEPT",
        };
        write!(f, "{} {}", self.left, op)?;
        if self.all {
            write!(f, " ALL")?;
        }
        write!(f, " {}", self.right)?;
        if let Some(order_by) = &self.order_by {
            write!(f, " {}", order_by)?;
        }
        Ok(())
    }
}

impl Display for OrderBy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ORDER BY ")?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match &element.key {
                OrderKey::Position(p) => write!(f, "{}", p)?,
                OrderKey::Alias(a) => write!(f, "{}", a)?,
                OrderKey::Expr(e) => write!(f, "{}", e)?,
            }
            if !element.ascending {
                write!(f, " DESC")?;
            }
        }
        Ok(())
    }
}

impl Display for Insert {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {} (", self.group.name)?;
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", column.name)?;
        }
        write!(f, ") ")?;
        match &self.source {
            InsertSource::Values(values) => {
                write!(f, "VALUES (")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, ")")
            }
            InsertSource::Query(q) => write!(f, "{}", q),
        }
    }
}

impl Display for Update {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {} SET ", self.group.name)?;
        for (i, (column, value)) in self.changes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", column.name, value)?;
        }
        if let Some(criteria) = &self.criteria {
            write!(f, " WHERE {}", criteria)?;
        }
        Ok(())
    }
}

impl Display for Delete {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}", self.group.name)?;
        if let Some(criteria) = &self.criteria {
            write!(f, " WHERE {}", criteria)?;
        }
        Ok(())
    }
}

impl Display for StoredProcedureCall {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "EXEC {}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

impl Display for ProcedureBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "BEGIN")?;
        for statement in &self.statements {
            write!(f, " {}", statement)?;
        }
        write!(f, " END")
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Declare {
                variable,
                ty,
                value,
            } => match value {
                Some(v) => write!(f, "DECLARE {} {} = {};", ty, variable, v),
                None => write!(f, "DECLARE {} {};", ty, variable),
            },
            Statement::Assign { variable, value } => write!(f, "{} = {};", variable, value),
            Statement::If(i) => {
                write!(f, "IF({}) {}", i.condition, i.then_block)?;
                if let Some(else_block) = &i.else_block {
                    write!(f, " ELSE {}", else_block)?;
                }
                Ok(())
            }
            Statement::While { condition, block } => write!(f, "WHILE({}) {}", condition, block),
            Statement::Loop {
                cursor,
                query,
                block,
            } => write!(f, "LOOP ON ({}) AS {} {}", query, cursor, block),
            Statement::Command(c) => write!(f, "{};", c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Constant, ElementRef};
    use super::*;
    use uuid::Uuid;

    fn element(name: &str) -> Expression {
        Expression::Element(ElementRef::new(Uuid::nil(), "g1", name, SqlType::Integer))
    }

    #[test]
    fn test_query_display() {
        let query = Query::select_from(
            vec![Symbol::new(element("e1"))],
            vec![FromItem::Group(GroupRef::new(Uuid::nil(), "g1"))],
        );
        assert_eq!(query.to_string(), "SELECT e1 FROM g1");
    }

    #[test]
    fn test_query_display_with_clauses() {
        let mut query = Query::select_from(
            vec![Symbol::aliased(element("e1"), "c")],
            vec![FromItem::Group(GroupRef::new(Uuid::nil(), "g1"))],
        );
        query.criteria = Some(Criteria::compare(
            element("e1"),
            super::super::CompareOp::Eq,
            Expression::Constant(Constant::integer(1)),
        ));
        query.order_by = Some(OrderBy {
            elements: vec![OrderByElement {
                key: OrderKey::Alias("c".to_string()),
                ascending: false,
            }],
        });
        assert_eq!(
            query.to_string(),
            "SELECT e1 AS c FROM g1 WHERE e1 = 1 ORDER BY c DESC"
        );
    }

    #[test]
    fn test_block_display() {
        let block = ProcedureBlock::new(vec![Statement::Assign {
            variable: "x".to_string(),
            value: Expression::Constant(Constant::integer(1)),
        }]);
        assert_eq!(block.to_string(), "BEGIN x = 1; END");
        assert_eq!(ProcedureBlock::empty().to_string(), "BEGIN END");
    }
}
