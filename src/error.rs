use thiserror::Error;

/// Is the result type of fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Is the type of errors returned by relations, records and joins.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Is returned when a column name is not in the schema it is looked up in.
    #[error("column `{name}` is not in the schema")]
    MissingColumn { name: String },

    /// Is returned when a tuple does not have one value per column of its schema.
    #[error("expecting a tuple of {expected} values, found {found}")]
    ArityMismatch { expected: usize, found: usize },

    /// Is returned when a position is beyond the size of a relation.
    #[error("index {index} is out of range for a relation of {size} tuples")]
    IndexOutOfRange { index: usize, size: usize },

    /// Is returned by a join that rejects duplicate keys.
    #[error("join key ({}) is not unique in relation `{relation}`", .key.join(", "))]
    DuplicateJoinKey { relation: String, key: Vec<String> },

    /// Is returned when a column name would appear twice in the result of a join.
    #[error("column `{name}` appears more than once in the joined schema")]
    DuplicateColumn { name: String },

    /// Is returned when fewer than two relations are given to a join.
    #[error("cannot join {count} relation(s): at least two are needed")]
    NotEnoughRelations { count: usize },

    /// Is returned when a join is given no key columns.
    #[error("join key is empty")]
    EmptyJoinKey,

    /// Is returned when relations with different schemas are concatenated.
    #[error("schema ({}) does not match schema ({})", .left.join(", "), .right.join(", "))]
    SchemaMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },
}
