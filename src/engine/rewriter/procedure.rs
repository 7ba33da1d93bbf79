//! Rewriting of virtual procedure bodies: the generated statement block for
//! a DML operation against a virtual view is specialized against the user's
//! actual command, then dead control flow is eliminated.

use super::criteria::{referenced_columns, simplify_criteria};
use super::expression::{simplify_expression, substitute_element};
use super::{command, ProcedureContext, RewriteEnv, RewriterError};
use crate::engine::metadata::Metadata;
use crate::engine::objects::{
    Command, CommandContext, Criteria, Expression, IfStatement, InsertSource, ProcedureBlock,
    Statement, VariableContext, VariableValue,
};

pub(crate) fn rewrite_virtual_procedure(
    block: ProcedureBlock,
    user_command: &Command,
    metadata: &dyn Metadata,
    context: &CommandContext,
) -> Result<ProcedureBlock, RewriterError> {
    let variables = derive_variable_context(user_command);
    let procedure = derive_procedure_context(user_command, &variables);
    let env = RewriteEnv {
        metadata,
        context,
        variables: Some(&variables),
        procedure: Some(&procedure),
    };
    rewrite_block(block, &env)
}

/// Builds the INPUT/CHANGING binding from the user's DML command: every
/// assigned column maps to its literal where one was given, and to an
/// unresolvable binding where the command supplies a non-literal.
fn derive_variable_context(user_command: &Command) -> VariableContext {
    let mut variables = VariableContext::new();
    match user_command {
        Command::Insert(insert) => {
            if let InsertSource::Values(values) = &insert.source {
                for (column, value) in insert.columns.iter().zip(values.iter()) {
                    variables.set(&column.name, binding_for(value));
                }
            }
        }
        Command::Update(update) => {
            for (column, value) in &update.changes {
                variables.set(&column.name, binding_for(value));
            }
        }
        _ => {}
    }
    variables
}

fn binding_for(value: &Expression) -> VariableValue {
    match value.as_constant() {
        Some(c) => VariableValue::Value(c.clone()),
        None => VariableValue::Unknown,
    }
}

fn derive_procedure_context(
    user_command: &Command,
    variables: &VariableContext,
) -> ProcedureContext {
    let user_criteria: Option<Criteria> = match user_command {
        Command::Update(u) => u.criteria.clone(),
        Command::Delete(d) => d.criteria.clone(),
        _ => None,
    };
    let mut supplied: std::collections::HashSet<String> =
        variables.supplied_columns().cloned().collect();
    if let Some(criteria) = &user_criteria {
        supplied.extend(referenced_columns(criteria));
    }
    ProcedureContext {
        user_criteria,
        supplied,
    }
}

pub(crate) fn rewrite_block(
    block: ProcedureBlock,
    env: &RewriteEnv,
) -> Result<ProcedureBlock, RewriterError> {
    let mut statements = vec![];
    for statement in block.statements {
        rewrite_statement(statement, env, &mut statements)?;
    }
    //An emptied block stays a block; callers rely on the shape
    Ok(ProcedureBlock::new(statements))
}

fn rewrite_statement(
    statement: Statement,
    env: &RewriteEnv,
    out: &mut Vec<Statement>,
) -> Result<(), RewriterError> {
    match statement {
        Statement::Declare {
            variable,
            ty,
            value,
        } => {
            let value = match value {
                Some(v) => Some(simplify_assigned(v, env)?),
                None => None,
            };
            out.push(Statement::Declare {
                variable,
                ty,
                value,
            });
        }
        Statement::Assign { variable, value } => {
            out.push(Statement::Assign {
                variable,
                value: simplify_assigned(value, env)?,
            });
        }
        Statement::If(if_statement) => rewrite_if(if_statement, env, out)?,
        Statement::While { condition, block } => {
            let condition = simplify_criteria(condition, env)?;
            if condition.is_true_criteria() {
                //Statically always entered: surface the hang now instead of
                //letting the engine spin later
                return Err(RewriterError::InfiniteLoop);
            }
            if condition.is_false_criteria() || condition.is_unknown_criteria() {
                debug!("Removing WHILE with never-true condition");
                return Ok(());
            }
            out.push(Statement::While {
                condition,
                block: rewrite_block(block, env)?,
            });
        }
        Statement::Loop {
            cursor,
            query,
            block,
        } => {
            let query = command::rewrite_query_command(query, env)?;
            let block = rewrite_block(block, env)?;
            if block.is_empty() {
                debug!("Removing LOOP with empty body");
                return Ok(());
            }
            out.push(Statement::Loop {
                cursor,
                query,
                block,
            });
        }
        Statement::Command(c) => {
            out.push(Statement::Command(command::rewrite_command(c, env)?));
        }
    }
    Ok(())
}

/// A bare INPUT reference on the right side of an assignment with neither a
/// supplied value nor a default degenerates to null; every other context
/// demands a concrete value.
fn simplify_assigned(value: Expression, env: &RewriteEnv) -> Result<Expression, RewriterError> {
    match value {
        Expression::Element(e) => {
            let substituted = substitute_element(e, env, true)?;
            simplify_expression(substituted, env)
        }
        other => simplify_expression(other, env),
    }
}

fn rewrite_if(
    if_statement: IfStatement,
    env: &RewriteEnv,
    out: &mut Vec<Statement>,
) -> Result<(), RewriterError> {
    let condition = simplify_criteria(if_statement.condition, env)?;

    if condition.is_true_criteria() {
        debug!("Inlining always-taken IF branch");
        let then_block = rewrite_block(if_statement.then_block, env)?;
        out.extend(then_block.statements);
        return Ok(());
    }
    if condition.is_false_criteria() || condition.is_unknown_criteria() {
        if let Some(else_block) = if_statement.else_block {
            debug!("Inlining always-taken ELSE branch");
            let else_block = rewrite_block(else_block, env)?;
            out.extend(else_block.statements);
        }
        return Ok(());
    }

    let then_block = rewrite_block(if_statement.then_block, env)?;
    let else_block = match if_statement.else_block {
        Some(b) => Some(rewrite_block(b, env)?),
        None => None,
    };
    out.push(Statement::If(IfStatement {
        condition,
        then_block,
        else_block,
    }));
    Ok(())
}
