mod command;
pub use command::Command;
pub use command::Delete;
pub use command::FromItem;
pub use command::GroupRef;
pub use command::IfStatement;
pub use command::Insert;
pub use command::InsertSource;
pub use command::IntoClause;
pub use command::JoinItem;
pub use command::JoinKind;
pub use command::OrderBy;
pub use command::OrderByElement;
pub use command::OrderKey;
pub use command::ProcedureBlock;
pub use command::Query;
pub use command::QueryCommand;
pub use command::SetOperation;
pub use command::SetQuery;
pub use command::Statement;
pub use command::StoredProcedureCall;
pub use command::Update;

mod command_context;
pub use command_context::CommandContext;

mod criteria;
pub use criteria::false_criteria;
pub use criteria::true_criteria;
pub use criteria::unknown_criteria;
pub use criteria::BetweenCriteria;
pub use criteria::CompareCriteria;
pub use criteria::CompareOp;
pub use criteria::CompoundCriteria;
pub use criteria::CompoundOp;
pub use criteria::Criteria;
pub use criteria::HasCriteria;
pub use criteria::IsNullCriteria;
pub use criteria::MatchCriteria;
pub use criteria::Quantifier;
pub use criteria::SetCriteria;
pub use criteria::SubqueryCompareCriteria;
pub use criteria::TranslateCriteria;

mod expression;
pub use expression::AggregateCall;
pub use expression::AggregateFunction;
pub use expression::CaseExpression;
pub use expression::Constant;
pub use expression::ElementRef;
pub use expression::Expression;
pub use expression::FunctionCall;
pub use expression::FunctionDescriptor;
pub use expression::FunctionKind;
pub use expression::Reference;
pub use expression::SearchedCaseExpression;

mod sql_type;
pub use sql_type::SqlType;

mod symbol;
pub use symbol::Symbol;

mod value;
pub use value::format_double;
pub use value::SqlValue;
pub use value::SqlValueError;
pub use value::DATE_FORMAT;
pub use value::TIMESTAMP_FORMAT;
pub use value::TIME_FORMAT;

mod variable_context;
pub use variable_context::VariableContext;
pub use variable_context::VariableValue;
