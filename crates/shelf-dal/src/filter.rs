use sqlx::QueryBuilder;

use crate::ChosenDB;

/// Comparison applied by a filter, named by the suffix used in `q[<field>_<predicate>]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// Case sensitive substring match
    Cont,
    Eq,
    NotEq,
    /// Case sensitive prefix match
    Start,
    /// Case sensitive suffix match
    End,
    Lt,
    Lteq,
    Gt,
    Gteq,
}

impl Predicate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Predicate::Cont => "cont",
            Predicate::Eq => "eq",
            Predicate::NotEq => "not_eq",
            Predicate::Start => "start",
            Predicate::End => "end",
            Predicate::Lt => "lt",
            Predicate::Lteq => "lteq",
            Predicate::Gt => "gt",
            Predicate::Gteq => "gteq",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub predicate: Predicate,
    pub value: String,
}

impl Filter {
    pub fn new(field: impl Into<String>, predicate: Predicate, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            predicate,
            value: value.into(),
        }
    }

    /// Appends SQL condition, field name must be already checked against whitelist
    pub(crate) fn push_condition<'a>(&self, builder: &mut QueryBuilder<'a, ChosenDB>) {
        let field = self.field.as_str();
        match self.predicate {
            Predicate::Cont => {
                builder.push(format!("instr({field}, "));
                builder.push_bind(self.value.clone());
                builder.push(") > 0");
            }
            Predicate::Start => {
                builder.push(format!("instr({field}, "));
                builder.push_bind(self.value.clone());
                builder.push(") = 1");
            }
            Predicate::End => {
                builder.push(format!("substr({field}, length({field}) - length("));
                builder.push_bind(self.value.clone());
                builder.push(") + 1) = ");
                builder.push_bind(self.value.clone());
            }
            Predicate::Eq
            | Predicate::NotEq
            | Predicate::Lt
            | Predicate::Lteq
            | Predicate::Gt
            | Predicate::Gteq => {
                let op = match self.predicate {
                    Predicate::Eq => "=",
                    Predicate::NotEq => "<>",
                    Predicate::Lt => "<",
                    Predicate::Lteq => "<=",
                    Predicate::Gt => ">",
                    _ => ">=",
                };
                builder.push(format!("{field} {op} "));
                builder.push_bind(self.value.clone());
            }
        }
    }
}

/// Appends WHERE clause joining all filters with AND
pub(crate) fn push_filters<'a>(builder: &mut QueryBuilder<'a, ChosenDB>, filters: &[Filter]) {
    for (idx, filter) in filters.iter().enumerate() {
        builder.push(if idx == 0 { " WHERE " } else { " AND " });
        filter.push_condition(builder);
    }
}
