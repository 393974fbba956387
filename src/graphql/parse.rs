use std::collections::{HashMap, HashSet};

use graphql_parser::query::{
    Definition, Directive, Document, FragmentDefinition, OperationDefinition, Selection,
    SelectionSet, TypeCondition, Value as AstValue,
};
use log::debug;
use serde_json::{Map, Value};

use crate::errors::{Error, Result, SchemaValidationError};
use crate::graphql::schema::{FieldType, QUERY_TYPE, Schema};
use crate::graphql::selection::{FieldSelection, SelectedField};

type Variables = Map<String, Value>;

/// Turn GraphQL query text into the root selection on `Query`.
///
/// Fragments are inlined, `@include`/`@skip` are applied and variables are
/// substituted, so the returned tree only holds plain fields. The result has
/// already been validated against `schema`.
pub fn parse_request(
    schema: &Schema,
    query: &str,
    operation_name: Option<&str>,
    variables: &Variables,
) -> Result<FieldSelection> {
    let document = graphql_parser::parse_query::<String>(query)?;
    let operation = select_operation(&document, operation_name)?;

    let (selection_set, variables, declared) = match operation {
        OperationDefinition::SelectionSet(set) => (set, Variables::new(), HashSet::new()),
        OperationDefinition::Query(op) => {
            let mut values = Variables::new();
            let mut declared = HashSet::new();
            for definition in &op.variable_definitions {
                declared.insert(definition.name.clone());
                if let Some(given) = variables.get(&definition.name) {
                    values.insert(definition.name.clone(), given.clone());
                } else if let Some(default) = &definition.default_value {
                    values.insert(definition.name.clone(), const_value(default)?);
                }
            }
            (&op.selection_set, values, declared)
        }
        OperationDefinition::Mutation(_) => {
            return Err(Error::UnsupportedOperation("mutations are not supported".into()));
        }
        OperationDefinition::Subscription(_) => {
            return Err(Error::UnsupportedOperation(
                "subscriptions are not supported".into(),
            ));
        }
    };

    let mut fragments = HashMap::new();
    for definition in &document.definitions {
        if let Definition::Fragment(fragment) = definition {
            if fragments.insert(fragment.name.as_str(), fragment).is_some() {
                return Err(SchemaValidationError::DuplicateFragment(fragment.name.clone()).into());
            }
        }
    }

    let mut lowering = Lowering {
        schema,
        fragments,
        variables,
        declared,
        spreading: vec![],
    };
    let mut root = FieldSelection::new();
    lowering.selection_set(QUERY_TYPE, selection_set, &mut root)?;
    schema.validate(QUERY_TYPE, &root)?;
    debug!("Parsed query into {} root fields", root.len());
    Ok(root)
}

fn operation_name<'d, 'a>(operation: &'d OperationDefinition<'a, String>) -> Option<&'d str> {
    match operation {
        OperationDefinition::SelectionSet(_) => None,
        OperationDefinition::Query(q) => q.name.as_deref(),
        OperationDefinition::Mutation(m) => m.name.as_deref(),
        OperationDefinition::Subscription(s) => s.name.as_deref(),
    }
}

fn select_operation<'d, 'a>(
    document: &'d Document<'a, String>,
    wanted: Option<&str>,
) -> Result<&'d OperationDefinition<'a, String>> {
    let operations: Vec<_> = document
        .definitions
        .iter()
        .filter_map(|d| match d {
            Definition::Operation(op) => Some(op),
            Definition::Fragment(_) => None,
        })
        .collect();

    match wanted {
        Some(name) => operations
            .into_iter()
            .find(|op| operation_name(op) == Some(name))
            .ok_or_else(|| Error::UnsupportedOperation(format!("unknown operation named '{name}'"))),
        None => match operations.as_slice() {
            [op] => Ok(*op),
            [] => Err(Error::UnsupportedOperation("document contains no operation".into())),
            _ => Err(Error::UnsupportedOperation(
                "operationName is required when the document has several operations".into(),
            )),
        },
    }
}

struct Lowering<'q, 'a> {
    schema: &'q Schema,
    fragments: HashMap<&'q str, &'q FragmentDefinition<'a, String>>,
    variables: Variables,
    // Variable names the operation declares
    declared: HashSet<String>,
    // Names of the fragments currently being expanded
    spreading: Vec<String>,
}

impl<'q, 'a> Lowering<'q, 'a> {
    fn selection_set(
        &mut self,
        type_name: &str,
        set: &'q SelectionSet<'a, String>,
        out: &mut FieldSelection,
    ) -> Result<()> {
        for item in &set.items {
            match item {
                Selection::Field(field) => {
                    if !self.included(&field.directives)? {
                        continue;
                    }
                    let def = self.schema.field(type_name, &field.name)?;

                    let mut selected = SelectedField::new(field.name.clone());
                    selected.alias = field.alias.clone();
                    for (name, value) in &field.arguments {
                        selected.arguments.push((name.clone(), self.value(value)?));
                    }

                    match def.ty {
                        FieldType::Scalar(_) => {
                            if !field.selection_set.items.is_empty() {
                                return Err(SchemaValidationError::UnexpectedSubselection {
                                    type_name: type_name.to_string(),
                                    field: field.name.clone(),
                                }
                                .into());
                            }
                        }
                        FieldType::Object(child) | FieldType::List(child) => {
                            if !field.selection_set.items.is_empty() {
                                let mut sub = FieldSelection::new();
                                self.selection_set(child, &field.selection_set, &mut sub)?;
                                selected.selection = Some(sub);
                            }
                        }
                    }
                    out.insert(selected)?;
                }
                Selection::FragmentSpread(spread) => {
                    if !self.included(&spread.directives)? {
                        continue;
                    }
                    let name = spread.fragment_name.as_str();
                    let fragment = *self
                        .fragments
                        .get(name)
                        .ok_or_else(|| SchemaValidationError::UnknownFragment(name.to_string()))?;
                    if self.spreading.iter().any(|s| s == name) {
                        return Err(SchemaValidationError::FragmentCycle(name.to_string()).into());
                    }
                    self.check_condition(type_name, Some(&fragment.type_condition))?;

                    self.spreading.push(name.to_string());
                    self.selection_set(type_name, &fragment.selection_set, out)?;
                    self.spreading.pop();
                }
                Selection::InlineFragment(inline) => {
                    if !self.included(&inline.directives)? {
                        continue;
                    }
                    self.check_condition(type_name, inline.type_condition.as_ref())?;
                    self.selection_set(type_name, &inline.selection_set, out)?;
                }
            }
        }
        Ok(())
    }

    fn check_condition(
        &self,
        type_name: &str,
        condition: Option<&TypeCondition<'a, String>>,
    ) -> Result<()> {
        let Some(TypeCondition::On(condition)) = condition else {
            return Ok(());
        };
        self.schema.object(condition)?;
        if condition != type_name {
            return Err(SchemaValidationError::TypeConditionMismatch {
                type_name: type_name.to_string(),
                condition: condition.clone(),
            }
            .into());
        }
        Ok(())
    }

    // Apply @include / @skip
    fn included(&self, directives: &[Directive<'a, String>]) -> Result<bool> {
        for directive in directives {
            let condition = match directive.name.as_str() {
                "include" => self.if_argument(directive)?,
                "skip" => !self.if_argument(directive)?,
                other => {
                    return Err(SchemaValidationError::UnknownDirective(other.to_string()).into());
                }
            };
            if !condition {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn if_argument(&self, directive: &Directive<'a, String>) -> Result<bool> {
        let value = directive
            .arguments
            .iter()
            .find(|(name, _)| name == "if")
            .map(|(_, value)| self.value(value))
            .transpose()?;
        match value {
            Some(Value::Bool(b)) => Ok(b),
            _ => Err(SchemaValidationError::InvalidArgument {
                field: format!("@{}", directive.name),
                argument: "if".into(),
                expected: "Boolean!".into(),
            }
            .into()),
        }
    }

    fn value(&self, value: &AstValue<'a, String>) -> Result<Value> {
        if let AstValue::Variable(name) = value {
            if !self.declared.contains(name) {
                return Err(SchemaValidationError::UndeclaredVariable(name.clone()).into());
            }
            return self
                .variables
                .get(name)
                .cloned()
                .ok_or_else(|| SchemaValidationError::MissingVariable(name.clone()).into());
        }
        match value {
            AstValue::List(items) => Ok(Value::Array(
                items.iter().map(|v| self.value(v)).collect::<Result<_>>()?,
            )),
            AstValue::Object(fields) => Ok(Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), self.value(v)?)))
                    .collect::<Result<_>>()?,
            )),
            other => const_value(other),
        }
    }
}

// Literal values; variables are not allowed here
fn const_value(value: &AstValue<'_, String>) -> Result<Value> {
    Ok(match value {
        AstValue::Variable(name) => {
            return Err(Error::QueryParse(format!(
                "variable '${name}' cannot be used in a default value"
            )));
        }
        AstValue::Int(n) => n.as_i64().map_or(Value::Null, Value::from),
        AstValue::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
        AstValue::String(s) => Value::String(s.clone()),
        AstValue::Boolean(b) => Value::Bool(*b),
        AstValue::Null => Value::Null,
        AstValue::Enum(e) => Value::String(e.clone()),
        AstValue::List(items) => Value::Array(items.iter().map(const_value).collect::<Result<_>>()?),
        AstValue::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| Ok((k.clone(), const_value(v)?)))
                .collect::<Result<_>>()?,
        ),
    })
}
