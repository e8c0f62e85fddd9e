use super::{checked, Relation};
use crate::{
    record::{pick, Record},
    source::SequenceSource,
    Error, Result, Schema, Tuple,
};

impl Relation {
    /// Materializes the receiver and returns a relation with the tuples at `indexes`, in
    /// the order of `indexes`. Fails with `IndexOutOfRange` if an index is not smaller
    /// than the size of the receiver.
    pub fn select(&self, indexes: &[usize]) -> Result<Relation> {
        let tuples = self.list()?;
        let selected = indexes
            .iter()
            .map(|&index| {
                tuples
                    .get(index)
                    .cloned()
                    .ok_or(Error::IndexOutOfRange {
                        index,
                        size: tuples.len(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Relation::from_source(
            self.schema.clone(),
            SequenceSource::materialized(selected, false),
        ))
    }

    /// Returns a lazy relation with the records of the receiver that satisfy `predicate`,
    /// in their original order.
    ///
    /// **Example**:
    /// ```rust
    /// use benchrel::Relation;
    ///
    /// let r = Relation::new(&["mode", "iops"], vec![vec!["read", "10"], vec!["write", "5"]]).unwrap();
    /// let reads = r.filter(|rec| rec.raw()[0] == "read");
    ///
    /// assert_eq!(vec![vec!["read", "10"]], *reads.list().unwrap());
    /// ```
    pub fn filter<P>(&self, mut predicate: P) -> Relation
    where
        P: FnMut(&Record) -> bool + 'static,
    {
        let schema = self.schema.clone();
        let tuples = self.iter().filter_map(move |t| match t {
            Ok(t) => {
                let record = Record::new(schema.clone(), t);
                if predicate(&record) {
                    Some(Ok(record.into_raw()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e)),
        });
        Relation::derived(self.schema.clone(), tuples)
    }

    /// Returns a lazy relation with the values of `columns` in each tuple of the receiver.
    /// The schema of the result is `columns`. Fails with `MissingColumn` if any of
    /// `columns` is not in the schema of the receiver.
    pub fn project<S: AsRef<str>>(&self, columns: &[S]) -> Result<Relation> {
        let indexes = self.schema.indexes_of(columns)?;
        let tuples = self
            .iter()
            .map(move |t| t.map(|t| pick(&t, &indexes)));
        Ok(Relation::derived(Schema::new(columns), tuples))
    }

    /// Returns a lazy relation with schema `to_columns` where each tuple is the result of
    /// applying `mapper` to the values of `from_columns` in a tuple of the receiver.
    ///
    /// Fails with `MissingColumn` if any of `from_columns` is not in the schema of the
    /// receiver. A tuple returned by `mapper` that does not match `to_columns` fails with
    /// `ArityMismatch` when it is produced.
    ///
    /// **Example**:
    /// ```rust
    /// use benchrel::Relation;
    ///
    /// let r = Relation::new(&["bs", "iops"], vec![vec!["4096", "100"]]).unwrap();
    /// let bps = r
    ///     .map(&["bs", "iops"], &["bps"], |t| {
    ///         let bs: u64 = t[0].parse().unwrap();
    ///         let iops: u64 = t[1].parse().unwrap();
    ///         vec![(bs * iops).to_string()]
    ///     })
    ///     .unwrap();
    ///
    /// assert_eq!(vec![vec!["409600"]], *bps.list().unwrap());
    /// ```
    pub fn map<S, T, F>(
        &self,
        from_columns: &[S],
        to_columns: &[T],
        mut mapper: F,
    ) -> Result<Relation>
    where
        S: AsRef<str>,
        T: AsRef<str>,
        F: FnMut(Tuple) -> Tuple + 'static,
    {
        let indexes = self.schema.indexes_of(from_columns)?;
        let arity = to_columns.len();
        let tuples = self
            .iter()
            .map(move |t| t.and_then(|t| checked(arity, mapper(pick(&t, &indexes)))));
        Ok(Relation::derived(Schema::new(to_columns), tuples))
    }

    /// Returns a lazy relation with schema `to_columns` where each tuple is the result of
    /// applying `mapper` to a record of the receiver. A tuple returned by `mapper` that
    /// does not match `to_columns` fails with `ArityMismatch` when it is produced.
    pub fn map_record<S, F>(&self, to_columns: &[S], mut mapper: F) -> Relation
    where
        S: AsRef<str>,
        F: FnMut(&Record) -> Tuple + 'static,
    {
        let schema = self.schema.clone();
        let arity = to_columns.len();
        let tuples = self.iter().map(move |t| {
            t.and_then(|t| checked(arity, mapper(&Record::new(schema.clone(), t))))
        });
        Relation::derived(Schema::new(to_columns), tuples)
    }
}
