use super::Relation;
use crate::{record::Record, source::SequenceSource, Result, Schema, Tuple};
use indexmap::IndexMap;

/// Folding and grouping operators. They consume the receiver in a single pass.
impl Relation {
    /// Folds the records of the receiver from left with `op`, starting from `init`.
    ///
    /// **Example**:
    /// ```rust
    /// use benchrel::Relation;
    ///
    /// let r = Relation::new(&["iops"], vec![vec!["10"], vec!["20"], vec!["12"]]).unwrap();
    /// let total = r
    ///     .fold(0, |sum, rec| sum + rec.raw()[0].parse::<u32>().unwrap())
    ///     .unwrap();
    ///
    /// assert_eq!(42, total);
    /// ```
    pub fn fold<A, F>(&self, init: A, mut op: F) -> Result<A>
    where
        F: FnMut(A, Record) -> A,
    {
        let mut result = init;
        for record in self.records() {
            result = op(result, record?);
        }
        Ok(result)
    }

    /// Groups the records of the receiver by their values at `key_columns`. For every
    /// new key, an accumulator is created by `init`; every record is then folded into the
    /// accumulator of its key by `combine`.
    ///
    /// The groups are returned in the order in which their keys are first encountered.
    /// Fails with `MissingColumn` if any of `key_columns` is not in the schema of the
    /// receiver.
    pub fn group_by<S, A, C, I>(
        &self,
        key_columns: &[S],
        mut combine: C,
        mut init: I,
    ) -> Result<IndexMap<Tuple, A>>
    where
        S: AsRef<str>,
        C: FnMut(&mut A, &Record),
        I: FnMut() -> A,
    {
        let indexes = self.schema.indexes_of(key_columns)?;
        let mut groups = IndexMap::new();
        for record in self.records() {
            let record = record?;
            let accumulator = groups
                .entry(record.pick(&indexes))
                .or_insert_with(&mut init);
            combine(accumulator, &record);
        }
        Ok(groups)
    }

    /// Groups the tuples of the receiver by their values at `key_columns` and returns, for
    /// every key, a relation with the values of `value_columns` in the tuples of that key.
    ///
    /// **Example**:
    /// ```rust
    /// use benchrel::Relation;
    ///
    /// let r = Relation::new(
    ///     &["mode", "nThreads", "iops"],
    ///     vec![vec!["read", "1", "10"], vec!["write", "1", "4"], vec!["read", "2", "19"]],
    /// )
    /// .unwrap();
    ///
    /// let groups = r.group_by_as_relation(&["mode"], &["nThreads", "iops"]).unwrap();
    /// let keys = groups.keys().collect::<Vec<_>>();
    ///
    /// assert_eq!(vec![&vec!["read"], &vec!["write"]], keys);
    /// assert_eq!(
    ///     vec![vec!["1", "10"], vec!["2", "19"]],
    ///     *groups[&vec!["read".to_string()]].list().unwrap()
    /// );
    /// ```
    pub fn group_by_as_relation<K, V>(
        &self,
        key_columns: &[K],
        value_columns: &[V],
    ) -> Result<IndexMap<Tuple, Relation>>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let values = self.schema.indexes_of(value_columns)?;
        self.grouped(key_columns, Schema::new(value_columns), &values)
    }

    /// Groups the tuples of the receiver by their values at `key_columns` and returns, for
    /// every key, a relation with the tuples of that key. This is `group_by_as_relation`
    /// with all the columns of the receiver as value columns.
    pub fn partition_by<S>(&self, key_columns: &[S]) -> Result<IndexMap<Tuple, Relation>>
    where
        S: AsRef<str>,
    {
        let values = (0..self.schema.len()).collect::<Vec<_>>();
        self.grouped(key_columns, self.schema.clone(), &values)
    }

    fn grouped<S: AsRef<str>>(
        &self,
        key_columns: &[S],
        schema: Schema,
        values: &[usize],
    ) -> Result<IndexMap<Tuple, Relation>> {
        let groups = self.group_by(
            key_columns,
            |tuples: &mut Vec<Tuple>, record| tuples.push(record.pick(values)),
            Vec::new,
        )?;
        Ok(groups
            .into_iter()
            .map(|(key, tuples)| {
                let relation = Relation::from_source(
                    schema.clone(),
                    SequenceSource::materialized(tuples, false),
                );
                (key, relation)
            })
            .collect())
    }
}
