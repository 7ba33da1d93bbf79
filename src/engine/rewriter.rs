//! The rewrite processor takes a resolved command and produces a
//! semantically equivalent but canonical, simplified command for the
//! planner. Rewriting is pure: it builds new trees, never touches live
//! data, and either fully succeeds or fails against the original command.

mod command;
mod criteria;
mod expression;
mod procedure;

use super::evaluator::EvaluatorError;
use super::metadata::{Metadata, MetadataError};
use super::objects::{Command, CommandContext, Criteria, ProcedureBlock, VariableContext};
use std::collections::HashSet;
use thiserror::Error;

pub struct Rewriter {}

impl Rewriter {
    /// Rewrites a whole command, recursing into every nested command.
    pub fn rewrite_command(
        command: Command,
        metadata: &dyn Metadata,
        context: &CommandContext,
    ) -> Result<Command, RewriterError> {
        let env = RewriteEnv::new(metadata, context);
        let rewritten = command::rewrite_command(command, &env)?;
        debug!("Rewrote command to: {}", rewritten);
        Ok(rewritten)
    }

    /// Rewrites a standalone criteria, for callers that only need a
    /// simplified predicate (e.g. pushdown decisions).
    pub fn rewrite_criteria(
        criteria: Criteria,
        metadata: &dyn Metadata,
        context: &CommandContext,
    ) -> Result<Criteria, RewriterError> {
        let env = RewriteEnv::new(metadata, context);
        criteria::simplify_criteria(criteria, &env)
    }

    /// Rewrites the generated procedure for a DML operation against a
    /// virtual view, binding INPUT/CHANGING references and HAS/TRANSLATE
    /// CRITERIA against the user's actual command.
    pub fn rewrite_virtual_procedure(
        block: ProcedureBlock,
        user_command: &Command,
        metadata: &dyn Metadata,
        context: &CommandContext,
    ) -> Result<ProcedureBlock, RewriterError> {
        procedure::rewrite_virtual_procedure(block, user_command, metadata, context)
    }
}

/// Everything a rewrite rule may consult, threaded through every call.
pub(crate) struct RewriteEnv<'a> {
    pub metadata: &'a dyn Metadata,
    pub context: &'a CommandContext,
    pub variables: Option<&'a VariableContext>,
    pub procedure: Option<&'a ProcedureContext>,
}

impl<'a> RewriteEnv<'a> {
    pub fn new(metadata: &'a dyn Metadata, context: &'a CommandContext) -> RewriteEnv<'a> {
        RewriteEnv {
            metadata,
            context,
            variables: None,
            procedure: None,
        }
    }
}

/// What the procedural rewriter knows about the user's DML command, needed
/// to resolve HAS CRITERIA and TRANSLATE CRITERIA.
pub(crate) struct ProcedureContext {
    pub user_criteria: Option<Criteria>,
    /// Upper-cased virtual column names the user supplied values or
    /// criteria for.
    pub supplied: HashSet<String>,
}

#[derive(Debug, Error)]
pub enum RewriterError {
    #[error("Constant evaluation failed: {0}")]
    Evaluation(#[from] EvaluatorError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("The variable {0} has no supplied value and no default")]
    UnresolvedVariable(String),
    #[error("Infinite loop detected in procedure: the WHILE condition always evaluates TRUE")]
    InfiniteLoop,
    #[error("ORDER BY key {0} does not match a projected column")]
    UnknownOrderKey(String),
    #[error("No common type found for set query column {0}")]
    NoCommonType(usize),
    #[error("{0} is only valid inside a virtual procedure")]
    ProcedureOnly(&'static str),
}
