//! Scalar filter expressions.
//!
//! Parses boolean predicates over scalar metadata fields, e.g.
//! `origin == "American" and year > 1945 and year < 2000`, into a
//! [`FilterExpr`] that a store evaluates per record during a search,
//! conjoined with vector similarity ranking.
//!
//! # Supported Syntax
//!
//! - Comparisons: `==`, `!=`, `>`, `>=`, `<`, `<=`
//! - Membership: `product_id in [100, 200]`
//! - Boolean connectives: `and`/`&&`, `or`/`||`, `not`/`!`, parentheses
//! - Literals: integers, floats, single- or double-quoted strings, booleans

use std::cmp::Ordering;

use pest::Parser;
use pest_derive::Parser;

use crate::error::{CrocusError, Result};
use crate::record::{FieldValue, Record};
use crate::schema::{CollectionSchema, FieldType};

/// Pest grammar parser for scalar filter expressions.
#[derive(Parser)]
#[grammar = "filter/grammar.pest"]
struct FilterStringParser;

/// Comparison operator in a filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
}

impl CompareOp {
    fn parse_str(s: &str) -> Result<Self> {
        match s {
            "==" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::Ne),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::Ge),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::Le),
            _ => Err(CrocusError::parse(format!("unknown operator: {}", s))),
        }
    }

    fn eval(&self, ordering: Option<Ordering>) -> bool {
        match (self, ordering) {
            (CompareOp::Eq, Some(Ordering::Equal)) => true,
            (CompareOp::Ne, Some(o)) => o != Ordering::Equal,
            (CompareOp::Gt, Some(Ordering::Greater)) => true,
            (CompareOp::Ge, Some(Ordering::Greater | Ordering::Equal)) => true,
            (CompareOp::Lt, Some(Ordering::Less)) => true,
            (CompareOp::Le, Some(Ordering::Less | Ordering::Equal)) => true,
            _ => false,
        }
    }
}

/// A literal value on the right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    String(String),
    /// Boolean literal.
    Bool(bool),
}

/// A parsed filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// All sub-expressions must match.
    And(Vec<FilterExpr>),
    /// At least one sub-expression must match.
    Or(Vec<FilterExpr>),
    /// The sub-expression must not match.
    Not(Box<FilterExpr>),
    /// A field/operator/literal comparison.
    Compare {
        /// Field name.
        field: String,
        /// Comparison operator.
        op: CompareOp,
        /// Literal to compare against.
        value: FilterValue,
    },
    /// Membership in a literal list.
    In {
        /// Field name.
        field: String,
        /// Accepted literals.
        values: Vec<FilterValue>,
    },
}

impl FilterExpr {
    /// Parse a filter expression string.
    pub fn parse(input: &str) -> Result<Self> {
        let mut pairs = FilterStringParser::parse(Rule::filter, input)
            .map_err(|e| CrocusError::parse(format!("invalid filter expression: {}", e)))?;

        let filter = pairs
            .next()
            .ok_or_else(|| CrocusError::parse("empty filter expression"))?;
        let or_expr = filter
            .into_inner()
            .find(|p| p.as_rule() == Rule::or_expr)
            .ok_or_else(|| CrocusError::parse("filter expression has no clauses"))?;
        Self::from_or_expr(or_expr)
    }

    fn from_or_expr(pair: pest::iterators::Pair<'_, Rule>) -> Result<Self> {
        let mut operands = Vec::new();
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::and_expr {
                operands.push(Self::from_and_expr(inner)?);
            }
        }
        match operands.len() {
            0 => Err(CrocusError::parse("filter expression has no clauses")),
            1 => Ok(operands.into_iter().next().unwrap()),
            _ => Ok(FilterExpr::Or(operands)),
        }
    }

    fn from_and_expr(pair: pest::iterators::Pair<'_, Rule>) -> Result<Self> {
        let mut operands = Vec::new();
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::unary_expr {
                operands.push(Self::from_unary_expr(inner)?);
            }
        }
        match operands.len() {
            0 => Err(CrocusError::parse("filter expression has no clauses")),
            1 => Ok(operands.into_iter().next().unwrap()),
            _ => Ok(FilterExpr::And(operands)),
        }
    }

    fn from_unary_expr(pair: pest::iterators::Pair<'_, Rule>) -> Result<Self> {
        let mut inner = pair.into_inner();
        let first = inner
            .next()
            .ok_or_else(|| CrocusError::parse("empty clause"))?;
        match first.as_rule() {
            Rule::not_op => {
                let operand = inner
                    .next()
                    .ok_or_else(|| CrocusError::parse("'not' requires an operand"))?;
                Ok(FilterExpr::Not(Box::new(Self::from_unary_expr(operand)?)))
            }
            Rule::binary_comparison => Self::from_binary_comparison(first),
            Rule::in_expr => Self::from_in_expr(first),
            Rule::or_expr => Self::from_or_expr(first),
            rule => Err(CrocusError::parse(format!(
                "unexpected clause: {:?}",
                rule
            ))),
        }
    }

    fn from_binary_comparison(pair: pest::iterators::Pair<'_, Rule>) -> Result<Self> {
        let mut field = None;
        let mut op = None;
        let mut value = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::field => field = Some(inner.as_str().to_string()),
                Rule::compare_op => op = Some(CompareOp::parse_str(inner.as_str())?),
                Rule::literal => value = Some(parse_literal(inner)?),
                _ => {}
            }
        }
        match (field, op, value) {
            (Some(field), Some(op), Some(value)) => Ok(FilterExpr::Compare { field, op, value }),
            _ => Err(CrocusError::parse("malformed comparison")),
        }
    }

    fn from_in_expr(pair: pest::iterators::Pair<'_, Rule>) -> Result<Self> {
        let mut field = None;
        let mut values = Vec::new();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::field => field = Some(inner.as_str().to_string()),
                Rule::literal => values.push(parse_literal(inner)?),
                _ => {}
            }
        }
        let field = field.ok_or_else(|| CrocusError::parse("malformed 'in' clause"))?;
        Ok(FilterExpr::In { field, values })
    }

    /// Check the expression against a schema before use.
    ///
    /// Every referenced field must be a declared scalar field with a literal
    /// of a compatible type; ordering operators are rejected on booleans.
    /// Fields are exempt from the declaration check when the schema enables
    /// dynamic fields.
    pub fn validate(&self, schema: &CollectionSchema) -> Result<()> {
        match self {
            FilterExpr::And(operands) | FilterExpr::Or(operands) => {
                for operand in operands {
                    operand.validate(schema)?;
                }
                Ok(())
            }
            FilterExpr::Not(operand) => operand.validate(schema),
            FilterExpr::Compare { field, op, value } => {
                if let Some(field_type) = lookup_scalar(schema, field)? {
                    check_literal_type(field, &field_type, value)?;
                    if matches!(field_type, FieldType::Bool)
                        && !matches!(op, CompareOp::Eq | CompareOp::Ne)
                    {
                        return Err(CrocusError::invalid_argument(format!(
                            "field '{}' is boolean; only == and != apply",
                            field
                        )));
                    }
                }
                Ok(())
            }
            FilterExpr::In { field, values } => {
                if let Some(field_type) = lookup_scalar(schema, field)? {
                    for value in values {
                        check_literal_type(field, &field_type, value)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Evaluate the expression against a record.
    ///
    /// A record missing the referenced field (possible only with dynamic
    /// fields) does not match.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            FilterExpr::And(operands) => operands.iter().all(|c| c.matches(record)),
            FilterExpr::Or(operands) => operands.iter().any(|c| c.matches(record)),
            FilterExpr::Not(operand) => !operand.matches(record),
            FilterExpr::Compare { field, op, value } => match record.get(field) {
                Some(actual) => op.eval(compare_values(actual, value)),
                None => false,
            },
            FilterExpr::In { field, values } => match record.get(field) {
                Some(actual) => values
                    .iter()
                    .any(|v| compare_values(actual, v) == Some(Ordering::Equal)),
                None => false,
            },
        }
    }
}

fn parse_literal(pair: pest::iterators::Pair<'_, Rule>) -> Result<FilterValue> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| CrocusError::parse("empty literal"))?;
    match inner.as_rule() {
        Rule::int_lit => inner
            .as_str()
            .parse::<i64>()
            .map(FilterValue::Int)
            .map_err(|e| CrocusError::parse(format!("invalid integer literal: {}", e))),
        Rule::float_lit => inner
            .as_str()
            .parse::<f64>()
            .map(FilterValue::Float)
            .map_err(|e| CrocusError::parse(format!("invalid float literal: {}", e))),
        Rule::string_lit => {
            let text = inner
                .into_inner()
                .next()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default();
            Ok(FilterValue::String(text))
        }
        Rule::bool_lit => Ok(FilterValue::Bool(
            inner.as_str().eq_ignore_ascii_case("true"),
        )),
        rule => Err(CrocusError::parse(format!("unexpected literal: {:?}", rule))),
    }
}

/// Resolve a referenced field to its scalar type. Returns `None` for fields
/// admitted through dynamic-field mode.
fn lookup_scalar(schema: &CollectionSchema, field: &str) -> Result<Option<FieldType>> {
    match schema.field(field) {
        Some(declared) => {
            if declared.field_type.is_vector() {
                return Err(CrocusError::invalid_argument(format!(
                    "filter field '{}' is a vector field; filters apply to scalar fields",
                    field
                )));
            }
            Ok(Some(declared.field_type.clone()))
        }
        None if schema.dynamic_fields_enabled() => Ok(None),
        None => Err(CrocusError::invalid_argument(format!(
            "filter references unknown field '{}'",
            field
        ))),
    }
}

fn check_literal_type(field: &str, field_type: &FieldType, value: &FilterValue) -> Result<()> {
    let compatible = match (field_type, value) {
        (FieldType::Int64, FilterValue::Int(_) | FilterValue::Float(_)) => true,
        (FieldType::Float, FilterValue::Int(_) | FilterValue::Float(_)) => true,
        (FieldType::Varchar { .. }, FilterValue::String(_)) => true,
        (FieldType::Bool, FilterValue::Bool(_)) => true,
        _ => false,
    };
    if compatible {
        Ok(())
    } else {
        Err(CrocusError::invalid_argument(format!(
            "filter literal for field '{}' does not match its {} type",
            field,
            field_type.type_name()
        )))
    }
}

fn compare_values(actual: &FieldValue, literal: &FilterValue) -> Option<Ordering> {
    match (actual, literal) {
        (FieldValue::Int64(a), FilterValue::Int(b)) => Some(a.cmp(b)),
        (FieldValue::Int64(a), FilterValue::Float(b)) => (*a as f64).partial_cmp(b),
        (FieldValue::Float(a), FilterValue::Int(b)) => (*a as f64).partial_cmp(&(*b as f64)),
        (FieldValue::Float(a), FilterValue::Float(b)) => (*a as f64).partial_cmp(b),
        (FieldValue::Varchar(a), FilterValue::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (FieldValue::Bool(a), FilterValue::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSchema;

    fn plot_record(title: &str, year: i64, origin: &str) -> Record {
        Record::new()
            .add_varchar("title", title)
            .add_int64("year", year)
            .add_varchar("origin", origin)
    }

    #[test]
    fn test_parse_conjunction() {
        let expr =
            FilterExpr::parse(r#"origin == "American" and year > 1945 and year < 2000"#).unwrap();
        match &expr {
            FilterExpr::And(operands) => assert_eq!(operands.len(), 3),
            other => panic!("expected And, got {:?}", other),
        }

        assert!(expr.matches(&plot_record("The Sting", 1973, "American")));
        assert!(!expr.matches(&plot_record("Oldboy", 2003, "Korean")));
        assert!(!expr.matches(&plot_record("Casablanca", 1942, "American")));
    }

    #[test]
    fn test_or_binds_looser_than_and() {
        // a or b and c parses as a or (b and c)
        let expr = FilterExpr::parse("year == 1960 or year > 1990 and year < 1995").unwrap();
        assert!(expr.matches(&plot_record("Psycho", 1960, "American")));
        assert!(expr.matches(&plot_record("Goodfellas", 1992, "American")));
        assert!(!expr.matches(&plot_record("Heat", 1996, "American")));
    }

    #[test]
    fn test_not_and_parens() {
        let expr = FilterExpr::parse(r#"not (origin == "American")"#).unwrap();
        assert!(expr.matches(&plot_record("Oldboy", 2003, "Korean")));
        assert!(!expr.matches(&plot_record("Heat", 1996, "American")));

        let bang = FilterExpr::parse(r#"!(origin == "American")"#).unwrap();
        assert_eq!(bang, expr);
    }

    #[test]
    fn test_in_list() {
        let expr = FilterExpr::parse("year in [1960, 1973]").unwrap();
        assert!(expr.matches(&plot_record("Psycho", 1960, "American")));
        assert!(!expr.matches(&plot_record("Heat", 1996, "American")));
    }

    #[test]
    fn test_single_quoted_strings() {
        let expr = FilterExpr::parse("origin == 'American'").unwrap();
        assert!(expr.matches(&plot_record("Heat", 1996, "American")));
    }

    #[test]
    fn test_float_comparison() {
        let expr = FilterExpr::parse("rating >= 4.5").unwrap();
        let record = Record::new().add_float("rating", 5.0);
        assert!(expr.matches(&record));
        let record = Record::new().add_float("rating", 4.0);
        assert!(!expr.matches(&record));
    }

    #[test]
    fn test_keyword_prefix_field_names() {
        // Field names beginning with a keyword must not be split.
        let expr = FilterExpr::parse("android == 1 and origin != 'x'").unwrap();
        let record = Record::new().add_int64("android", 1).add_varchar("origin", "y");
        assert!(expr.matches(&record));
    }

    #[test]
    fn test_missing_field_does_not_match() {
        let expr = FilterExpr::parse("year > 1945").unwrap();
        assert!(!expr.matches(&Record::new()));
    }

    #[test]
    fn test_parse_errors() {
        assert!(FilterExpr::parse("").is_err());
        assert!(FilterExpr::parse("year >").is_err());
        assert!(FilterExpr::parse("and year > 1").is_err());
        assert!(FilterExpr::parse("year > 1 and").is_err());
        assert!(FilterExpr::parse("(year > 1").is_err());
    }

    #[test]
    fn test_validate_against_schema() {
        let schema = CollectionSchema::builder()
            .add_field(FieldSchema::new("id", FieldType::Int64).primary_key())
            .add_field(FieldSchema::new("year", FieldType::Int64))
            .add_field(FieldSchema::new("origin", FieldType::Varchar { max_length: 64 }))
            .add_field(FieldSchema::new("embedding", FieldType::FloatVector { dim: 4 }))
            .build()
            .unwrap();

        let good =
            FilterExpr::parse(r#"origin == "American" and year > 1945 and year < 2000"#).unwrap();
        assert!(good.validate(&schema).is_ok());

        let unknown = FilterExpr::parse("genre == 'noir'").unwrap();
        assert!(unknown.validate(&schema).is_err());

        let vector_field = FilterExpr::parse("embedding == 1").unwrap();
        assert!(vector_field.validate(&schema).is_err());

        let type_mismatch = FilterExpr::parse("origin > 5").unwrap();
        assert!(type_mismatch.validate(&schema).is_err());
    }
}
