/*! Implements the sort-merge join of relations on a shared key.

Every input is projected to the key columns followed by its value columns, sorted on the
key and merged with the others. The tuples of a join are the key followed by the values
of each input, in the order of the inputs, and are sorted on the key.
*/
use crate::{
    source::SequenceSource,
    tools::{duplicate_key, join_helper},
    Error, Relation, Result, Schema, Tuple,
};
use std::{collections::HashSet, rc::Rc};

/// Decides what a join does with a key that appears in more than one tuple of an input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DuplicateKeys {
    /// Joins every tuple of a key on one side with every tuple of the same key on the
    /// other side.
    Expand,

    /// Fails the join with `DuplicateJoinKey`.
    Reject,
}

impl Default for DuplicateKeys {
    fn default() -> Self {
        Self::Expand
    }
}

/// Joins `left` and `right`, each given as a relation with the value columns to keep,
/// on the columns of `key`. Duplicate keys are expanded.
///
/// **Example**:
/// ```rust
/// use benchrel::{join, Relation};
///
/// let reads = Relation::new(&["bs", "read"], vec![vec!["4k", "10"], vec!["8k", "7"]]).unwrap();
/// let writes = Relation::new(&["bs", "write"], vec![vec!["8k", "3"], vec!["4k", "5"]]).unwrap();
///
/// let joined = join(&["bs"], (&reads, &["read"]), (&writes, &["write"])).unwrap();
///
/// assert_eq!(&["bs", "read", "write"], joined.schema().columns());
/// assert_eq!(
///     vec![vec!["4k", "10", "5"], vec!["8k", "7", "3"]],
///     *joined.list().unwrap()
/// );
/// ```
pub fn join<K, L, R>(
    key: &[K],
    left: (&Relation, &[L]),
    right: (&Relation, &[R]),
) -> Result<Relation>
where
    K: AsRef<str>,
    L: AsRef<str>,
    R: AsRef<str>,
{
    join_with(DuplicateKeys::default(), key, left, right)
}

/// Is `join` with an explicit policy for duplicate keys.
///
/// Fails with `EmptyJoinKey` if `key` is empty, with `DuplicateColumn` if a column name
/// would appear twice in the result, with `MissingColumn` if an input lacks one of its
/// columns and, under `DuplicateKeys::Reject`, with `DuplicateJoinKey`.
pub fn join_with<K, L, R>(
    policy: DuplicateKeys,
    key: &[K],
    left: (&Relation, &[L]),
    right: (&Relation, &[R]),
) -> Result<Relation>
where
    K: AsRef<str>,
    L: AsRef<str>,
    R: AsRef<str>,
{
    if key.is_empty() {
        return Err(Error::EmptyJoinKey);
    }
    let schema = joined_schema(key, &[names(left.1), names(right.1)])?;

    let left = sorted_input(policy, key, left.0, left.1)?;
    let right = sorted_input(policy, key, right.0, right.1)?;

    let mut tuples = Vec::new();
    join_helper(&left, &right, key.len(), |k, l, r| {
        let mut tuple = Vec::with_capacity(k.len() + l.len() + r.len());
        tuple.extend_from_slice(k);
        tuple.extend_from_slice(l);
        tuple.extend_from_slice(r);
        tuples.push(tuple);
    });

    #[cfg(feature = "tracing")]
    tracing::debug!(
        left = left.len(),
        right = right.len(),
        joined = tuples.len(),
        "merged join inputs"
    );

    Ok(Relation::from_source(
        schema,
        SequenceSource::materialized(tuples, false),
    ))
}

/// Joins all `inputs`, each given as a relation with the value columns to keep, on the
/// columns of `key`. The inputs are joined from left to right. Duplicate keys are
/// expanded.
pub fn join_all<K, S>(key: &[K], inputs: &[(&Relation, &[S])]) -> Result<Relation>
where
    K: AsRef<str>,
    S: AsRef<str>,
{
    join_all_with(DuplicateKeys::default(), key, inputs)
}

/// Is `join_all` with an explicit policy for duplicate keys. Fails with
/// `NotEnoughRelations` if there are fewer than two inputs and otherwise as `join_with`.
pub fn join_all_with<K, S>(
    policy: DuplicateKeys,
    key: &[K],
    inputs: &[(&Relation, &[S])],
) -> Result<Relation>
where
    K: AsRef<str>,
    S: AsRef<str>,
{
    if inputs.len() < 2 {
        return Err(Error::NotEnoughRelations {
            count: inputs.len(),
        });
    }
    if key.is_empty() {
        return Err(Error::EmptyJoinKey);
    }
    let groups = inputs.iter().map(|(_, c)| names(c)).collect::<Vec<_>>();
    joined_schema(key, &groups)?;

    let mut result = join_with(policy, key, inputs[0], inputs[1])?;
    let mut columns = [names(inputs[0].1), names(inputs[1].1)].concat();
    for &(relation, cols) in &inputs[2..] {
        result = join_with(policy, key, (&result, &columns[..]), (relation, cols))?;
        columns.extend(names(cols));
    }
    Ok(result)
}

fn names<S: AsRef<str>>(columns: &[S]) -> Vec<&str> {
    columns.iter().map(AsRef::as_ref).collect()
}

/// Returns the schema of a join on `key` that keeps the value columns in `groups`.
fn joined_schema<K: AsRef<str>>(key: &[K], groups: &[Vec<&str>]) -> Result<Schema> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for name in key
        .iter()
        .map(AsRef::as_ref)
        .chain(groups.iter().flatten().copied())
    {
        if !seen.insert(name) {
            return Err(Error::DuplicateColumn {
                name: name.to_string(),
            });
        }
        columns.push(name);
    }
    Ok(Schema::new(&columns))
}

/// Returns the tuples of `relation` projected to `key` followed by `columns`, sorted on
/// the key.
fn sorted_input<K, S>(
    policy: DuplicateKeys,
    key: &[K],
    relation: &Relation,
    columns: &[S],
) -> Result<Rc<Vec<Tuple>>>
where
    K: AsRef<str>,
    S: AsRef<str>,
{
    let projection = [names(key), names(columns)].concat();
    let tuples = relation
        .project(&projection)?
        .sort_by_columns(key, false)?
        .list()?;

    if policy == DuplicateKeys::Reject {
        if let Some(key) = duplicate_key(&tuples, key.len()) {
            return Err(Error::DuplicateJoinKey {
                relation: relation.name().unwrap_or("<unnamed>").to_string(),
                key: key.to_vec(),
            });
        }
    }
    Ok(tuples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(tuples: &[&[&str]]) -> Vec<Tuple> {
        tuples
            .iter()
            .map(|t| t.iter().map(|v| v.to_string()).collect())
            .collect()
    }

    fn keyed(value: &str) -> Relation {
        Relation::new(
            &["k1", "k2", value],
            (0..3).map(|i| vec![i.to_string(), i.to_string(), i.to_string()]),
        )
        .unwrap()
    }

    fn grid() -> Relation {
        let tuples = (0..3)
            .flat_map(|x| (0..3).map(move |y| vec![x, y, x + y]))
            .map(|t| t.into_iter().map(|v| v.to_string()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        Relation::new(&["k1", "k2", "v2"], tuples).unwrap()
    }

    #[test]
    fn test_join() {
        {
            let a = keyed("v1");
            let b = grid();
            let joined = join(&["k1", "k2"], (&a, &["v1"]), (&b, &["v2"])).unwrap();
            assert_eq!(&["k1", "k2", "v1", "v2"], joined.schema().columns());
            assert_eq!(
                strings(&[
                    &["0", "0", "0", "0"],
                    &["1", "1", "1", "2"],
                    &["2", "2", "2", "4"]
                ]),
                *joined.list().unwrap()
            );
        }
        {
            let a = keyed("v1");
            let b = grid();
            let joined = join::<_, &str, &str>(&["k1"], (&a, &[]), (&b, &[])).unwrap();
            assert_eq!(&["k1"], joined.schema().columns());
            assert_eq!(9, joined.size().unwrap());
        }
        {
            let a = Relation::new(&["k", "v"], vec![vec!["1", "a"], vec!["3", "c"]]).unwrap();
            let b = Relation::new(&["w", "k"], vec![vec!["y", "2"], vec!["z", "3"]]).unwrap();
            let joined = join(&["k"], (&a, &["v"]), (&b, &["w"])).unwrap();
            assert_eq!(strings(&[&["3", "c", "z"]]), *joined.list().unwrap());
        }
        {
            let a = Relation::new(&["k", "v"], vec![vec!["1", "a"]]).unwrap();
            let b = Relation::empty(&["k", "w"]);
            let joined = join(&["k"], (&a, &["v"]), (&b, &["w"])).unwrap();
            assert_eq!(0, joined.size().unwrap());
        }
    }

    #[test]
    fn test_join_streaming() {
        let a = Relation::streaming(&["k", "v"], vec![vec!["2", "b"], vec!["1", "a"]]);
        let b = Relation::new(&["k", "w"], vec![vec!["1", "x"], vec!["2", "y"]]).unwrap();
        let joined = join(&["k"], (&a, &["v"]), (&b, &["w"])).unwrap();
        assert_eq!(
            strings(&[&["1", "a", "x"], &["2", "b", "y"]]),
            *joined.list().unwrap()
        );
        assert_eq!(0, a.size().unwrap());
        assert_eq!(2, b.size().unwrap());
    }

    #[test]
    fn test_join_duplicate_keys() {
        let a = Relation::new(&["k", "v"], vec![vec!["1", "a"], vec!["1", "b"]])
            .unwrap()
            .with_name("runs");
        let b = Relation::new(&["k", "w"], vec![vec!["2", "y"], vec!["1", "x"]]).unwrap();
        {
            let joined = join(&["k"], (&a, &["v"]), (&b, &["w"])).unwrap();
            assert_eq!(
                strings(&[&["1", "a", "x"], &["1", "b", "x"]]),
                *joined.list().unwrap()
            );
        }
        {
            assert_eq!(
                Error::DuplicateJoinKey {
                    relation: "runs".into(),
                    key: vec!["1".into()],
                },
                join_with(DuplicateKeys::Reject, &["k"], (&a, &["v"]), (&b, &["w"]))
                    .unwrap_err()
            );
        }
        {
            let joined =
                join_with(DuplicateKeys::Reject, &["k"], (&b, &["w"]), (&b, &[] as &[&str]))
                    .unwrap();
            assert_eq!(strings(&[&["1", "x"], &["2", "y"]]), *joined.list().unwrap());
        }
        {
            assert_eq!(
                Error::DuplicateJoinKey {
                    relation: "<unnamed>".into(),
                    key: vec!["1".into()],
                },
                join_with(
                    DuplicateKeys::Reject,
                    &["k"],
                    (&b, &["w"]),
                    (&a.project(&["k", "v"]).unwrap(), &["v"])
                )
                .unwrap_err()
            );
        }
    }

    #[test]
    fn test_join_errors() {
        let a = Relation::new(&["k", "v"], vec![vec!["1", "a"]]).unwrap();
        let b = Relation::new(&["k", "v", "w"], vec![vec!["1", "b", "c"]]).unwrap();
        {
            assert_eq!(
                Error::EmptyJoinKey,
                join::<&str, _, _>(&[], (&a, &["v"]), (&b, &["w"])).unwrap_err()
            );
        }
        {
            assert_eq!(
                Error::DuplicateColumn { name: "v".into() },
                join(&["k"], (&a, &["v"]), (&b, &["v"])).unwrap_err()
            );
            assert_eq!(
                Error::DuplicateColumn { name: "k".into() },
                join(&["k"], (&a, &["k"]), (&b, &["w"])).unwrap_err()
            );
        }
        {
            assert_eq!(
                Error::MissingColumn { name: "x".into() },
                join(&["k"], (&a, &["v"]), (&b, &["x"])).unwrap_err()
            );
            assert_eq!(
                Error::MissingColumn { name: "w".into() },
                join(&["w"], (&a, &["v"]), (&b, &["k"])).unwrap_err()
            );
        }
    }

    #[test]
    fn test_join_all() {
        let a = Relation::new(
            &["k", "a"],
            vec![vec!["1", "a1"], vec!["2", "a2"], vec!["3", "a3"]],
        )
        .unwrap();
        let b = Relation::new(&["k", "b"], vec![vec!["3", "b3"], vec!["2", "b2"]]).unwrap();
        let c = Relation::new(&["c", "k"], vec![vec!["c3", "3"], vec!["c1", "1"]]).unwrap();
        {
            let joined =
                join_all(&["k"], &[(&a, &["a"][..]), (&b, &["b"]), (&c, &["c"])]).unwrap();
            assert_eq!(&["k", "a", "b", "c"], joined.schema().columns());
            assert_eq!(strings(&[&["3", "a3", "b3", "c3"]]), *joined.list().unwrap());
        }
        {
            let joined = join_all(&["k"], &[(&a, &["a"][..]), (&b, &["b"])]).unwrap();
            assert_eq!(
                strings(&[&["2", "a2", "b2"], &["3", "a3", "b3"]]),
                *joined.list().unwrap()
            );
        }
    }

    #[test]
    fn test_join_all_errors() {
        let a = Relation::new(&["k", "a"], vec![vec!["1", "a1"]]).unwrap();
        let b = Relation::new(&["k", "b"], vec![vec!["1", "b1"]]).unwrap();
        {
            assert_eq!(
                Error::NotEnoughRelations { count: 1 },
                join_all(&["k"], &[(&a, &["a"][..])]).unwrap_err()
            );
            assert_eq!(
                Error::NotEnoughRelations { count: 0 },
                join_all::<_, &str>(&["k"], &[]).unwrap_err()
            );
        }
        {
            assert_eq!(
                Error::EmptyJoinKey,
                join_all::<&str, _>(&[], &[(&a, &["a"][..]), (&b, &["b"])]).unwrap_err()
            );
        }
        {
            assert_eq!(
                Error::DuplicateColumn { name: "a".into() },
                join_all(&["k"], &[(&a, &["a"][..]), (&b, &["b"]), (&a, &["a"])]).unwrap_err()
            );
        }
    }

    #[test]
    fn test_duplicate_keys_default() {
        assert_eq!(DuplicateKeys::Expand, DuplicateKeys::default());
    }
}
