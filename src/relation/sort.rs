use super::Relation;
use crate::{record::Record, source::SequenceSource, Result, Tuple};
use std::cmp::Ordering;

/// Returns `ordering`, inverted if `reverse` is true.
#[inline(always)]
fn directed(ordering: Ordering, reverse: bool) -> Ordering {
    if reverse {
        ordering.reverse()
    } else {
        ordering
    }
}

/// Compares `left` and `right` lexicographically on their values at `indexes`.
pub(crate) fn compare_at(left: &[String], right: &[String], indexes: &[usize]) -> Ordering {
    indexes
        .iter()
        .map(|&i| left[i].cmp(&right[i]))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Sorting operators. All of them materialize the receiver and return a materialized
/// relation. Sorting is stable, also when `reverse` is true: tuples that compare equal
/// keep their original order.
impl Relation {
    /// Sorts the tuples of the receiver in their natural (lexicographic) order.
    pub fn sort(&self, reverse: bool) -> Result<Relation> {
        let mut tuples = self.list()?.to_vec();
        tuples.sort_by(|a, b| directed(a.cmp(b), reverse));
        Ok(self.sorted(tuples))
    }

    /// Sorts the tuples of the receiver lexicographically on the values of `columns`.
    /// Fails with `MissingColumn` if any of `columns` is not in the schema of the receiver.
    ///
    /// **Example**:
    /// ```rust
    /// use benchrel::Relation;
    ///
    /// let r = Relation::new(
    ///     &["mode", "nThreads"],
    ///     vec![vec!["write", "2"], vec!["read", "4"], vec!["read", "1"]],
    /// )
    /// .unwrap();
    ///
    /// let sorted = r.sort_by_columns(&["mode"], false).unwrap();
    /// assert_eq!(
    ///     vec![vec!["read", "4"], vec!["read", "1"], vec!["write", "2"]],
    ///     *sorted.list().unwrap()
    /// );
    /// ```
    pub fn sort_by_columns<S>(&self, columns: &[S], reverse: bool) -> Result<Relation>
    where
        S: AsRef<str>,
    {
        let indexes = self.schema.indexes_of(columns)?;
        let mut tuples = self.list()?.to_vec();
        tuples.sort_by(|a, b| directed(compare_at(a, b, &indexes), reverse));
        Ok(self.sorted(tuples))
    }

    /// Sorts the records of the receiver on the key computed by `key`. The key is
    /// computed once per record.
    pub fn sort_by_key<K, F>(&self, mut key: F, reverse: bool) -> Result<Relation>
    where
        K: Ord,
        F: FnMut(&Record) -> K,
    {
        let mut keyed = self
            .record_list()?
            .into_iter()
            .map(|r| (key(&r), r.into_raw()))
            .collect::<Vec<_>>();
        keyed.sort_by(|a, b| directed(a.0.cmp(&b.0), reverse));
        Ok(self.sorted(keyed.into_iter().map(|(_, t)| t).collect()))
    }

    /// Sorts the records of the receiver with the three-way `comparator`.
    pub fn sort_by<F>(&self, mut comparator: F, reverse: bool) -> Result<Relation>
    where
        F: FnMut(&Record, &Record) -> Ordering,
    {
        let mut records = self.record_list()?;
        records.sort_by(|a, b| directed(comparator(a, b), reverse));
        Ok(self.sorted(records.into_iter().map(Record::into_raw).collect()))
    }

    fn sorted(&self, tuples: Vec<Tuple>) -> Relation {
        Relation::from_source(
            self.schema.clone(),
            SequenceSource::materialized(tuples, false),
        )
    }
}
