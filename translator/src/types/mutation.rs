use crate::types::Cell;

/// A generated statement together with its positional parameters.
///
/// The number of parameters always equals the number of `?` placeholders in [`Mutation::sql`].
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    sql: String,
    params: Vec<Cell>,
}

impl Mutation {
    /// Creates a new [`Mutation`].
    pub fn new(sql: impl Into<String>, params: Vec<Cell>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Returns the statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the positional parameters in placeholder order.
    pub fn params(&self) -> &[Cell] {
        &self.params
    }

    /// Consumes the mutation and returns its statement text and parameters.
    pub fn into_parts(self) -> (String, Vec<Cell>) {
        (self.sql, self.params)
    }
}
