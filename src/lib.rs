/*! benchrel is a small in-memory relational engine over tuples of strings.

Benchmark results are loaded into a [`Relation`], either as a list or as a one-shot
stream, and then filtered, projected, grouped, sorted and joined on column names.

**Example**:
```rust
use benchrel::{join_all, Relation};

let a = Relation::new(&["k", "v1"], vec![vec!["0", "a"], vec!["1", "b"]]).unwrap();
let b = Relation::new(&["k", "v2"], vec![vec!["1", "y"], vec!["0", "x"]]).unwrap();

let joined = join_all(&["k"], &[(&a, &["v1"][..]), (&b, &["v2"][..])]).unwrap();

assert_eq!(&["k", "v1", "v2"][..], joined.schema().columns());
assert_eq!(
    vec![vec!["0", "a", "x"], vec!["1", "b", "y"]],
    *joined.list().unwrap()
);
```
*/
mod error;
mod join;
mod record;
mod relation;
mod schema;
mod source;
mod tools;

pub use error::{Error, Result};
pub use join::{join, join_all, join_all_with, join_with, DuplicateKeys};
pub use record::Record;
pub use relation::{Records, Relation};
pub use schema::Schema;
pub use source::{SequenceSource, Tuples};

/// Is the raw content of a record: one string per column of its schema.
pub type Tuple = Vec<String>;
