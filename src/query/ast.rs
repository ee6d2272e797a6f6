use regex::Regex;
use serde_json::Value;

/// One step of a compiled selector
#[derive(Debug, Clone)]
pub enum Step {
    /// `.name` or `['name']`
    Member(String),
    /// `.*` or `[*]`: every mapping value or sequence item
    Wildcard,
    /// `[3]`
    Index(usize),
    /// `[?(expr)]`: children whose key/value satisfy `expr`
    Filter(Expr),
    /// `..step`: apply `step` to the node and every descendant
    Descendant(Box<Step>),
    /// `~`: replace each node by its own key
    Keys,
}

/// Boolean expression evaluated against one candidate child
#[derive(Debug, Clone)]
pub enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Compare(Operand, CompareOp, Operand),
    Matches(Operand, Regex),
    In(Operand, Vec<Value>),
    Truthy(Operand),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// `@key`: the candidate's key (index as a string for sequences)
    Key,
    /// `@` or `@.a.b`: the candidate value or a property below it
    Current(Vec<String>),
    Literal(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// The child a filter is being evaluated for
pub struct Candidate<'a> {
    pub key: &'a str,
    pub value: &'a Value,
}

impl Operand {
    fn resolve(&self, candidate: &Candidate<'_>) -> Option<Value> {
        match self {
            Operand::Key => Some(Value::String(candidate.key.to_string())),
            Operand::Current(props) => props
                .iter()
                .try_fold(candidate.value, |node, prop| match node {
                    Value::Object(map) => map.get(prop),
                    Value::Array(items) => prop.parse::<usize>().ok().and_then(|i| items.get(i)),
                    _ => None,
                })
                .cloned(),
            Operand::Literal(value) => Some(value.clone()),
        }
    }
}

impl Expr {
    pub fn eval(&self, candidate: &Candidate<'_>) -> bool {
        match self {
            Expr::Or(lhs, rhs) => lhs.eval(candidate) || rhs.eval(candidate),
            Expr::And(lhs, rhs) => lhs.eval(candidate) && rhs.eval(candidate),
            Expr::Not(inner) => !inner.eval(candidate),
            Expr::Compare(lhs, op, rhs) => {
                compare(lhs.resolve(candidate).as_ref(), *op, rhs.resolve(candidate).as_ref())
            }
            Expr::Matches(operand, regex) => match operand.resolve(candidate) {
                Some(Value::String(s)) => regex.is_match(&s),
                Some(Value::Number(n)) => regex.is_match(&n.to_string()),
                _ => false,
            },
            Expr::In(operand, list) => operand
                .resolve(candidate)
                .is_some_and(|value| list.contains(&value)),
            Expr::Truthy(operand) => operand.resolve(candidate).is_some_and(|v| is_truthy(&v)),
        }
    }
}

fn compare(lhs: Option<&Value>, op: CompareOp, rhs: Option<&Value>) -> bool {
    match op {
        CompareOp::Eq => lhs.is_some() && lhs == rhs,
        CompareOp::Ne => lhs != rhs,
        CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
            let ordering = match (lhs, rhs) {
                (Some(Value::Number(a)), Some(Value::Number(b))) => {
                    a.as_f64().partial_cmp(&b.as_f64())
                }
                (Some(Value::String(a)), Some(Value::String(b))) => Some(a.cmp(b)),
                _ => None,
            };
            ordering.is_some_and(|ord| match op {
                CompareOp::Lt => ord.is_lt(),
                CompareOp::Le => ord.is_le(),
                CompareOp::Gt => ord.is_gt(),
                _ => ord.is_ge(),
            })
        }
    }
}

/// JavaScript-style truthiness, which is what selector authors expect
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!("x")));
    }

    #[test]
    fn test_compare_missing_operands() {
        let value = json!({"in": "query"});
        let candidate = Candidate { key: "0", value: &value };
        let missing = Operand::Current(vec!["name".to_string()]);
        let lit = Operand::Literal(json!("max"));
        assert!(!Expr::Compare(missing.clone(), CompareOp::Eq, lit.clone()).eval(&candidate));
        assert!(Expr::Compare(missing, CompareOp::Ne, lit).eval(&candidate));
    }
}
