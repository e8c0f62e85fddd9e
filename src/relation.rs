/*! Defines [`Relation`], a named table of string tuples, and its relational operators.

Operators read the receiver's tuples and return a new relation. Most of them are lazy:
they wrap the receiver's sequence in a transformation that runs only when the result
is iterated. Operators that need the whole input (sorting, grouping, selecting by
position) materialize the receiver first.

[`Relation`]: ./struct.Relation.html
*/
mod group;
mod sort;
mod transform;

use crate::{
    record::Record,
    source::{SequenceSource, Tuples},
    Error, Result, Schema, Tuple,
};
use std::{fmt, rc::Rc};

/// Is a table of tuples labelled by a [`Schema`]. The tuples are held in a
/// [`SequenceSource`] and are either streamed once or materialized and replayed.
///
/// [`Schema`]: ./struct.Schema.html
/// [`SequenceSource`]: ./struct.SequenceSource.html
///
/// **Example**:
/// ```rust
/// use benchrel::Relation;
///
/// let r = Relation::new(
///     &["pattern", "nThreads", "iops"],
///     vec![vec!["rnd", "1", "100"], vec!["seq", "1", "900"], vec!["rnd", "2", "180"]],
/// )
/// .unwrap();
///
/// let rnd = r
///     .filter(|rec| rec.get_key(&["pattern"]).map_or(false, |k| k.raw() == ["rnd"]))
///     .project(&["nThreads", "iops"])
///     .unwrap();
///
/// assert_eq!(vec![vec!["1", "100"], vec!["2", "180"]], *rnd.list().unwrap());
/// ```
pub struct Relation {
    /// Is the (optional) name of the relation.
    name: Option<String>,

    /// Is the schema of the tuples in this relation.
    schema: Schema,

    /// Is the sequence of tuples in this relation.
    source: SequenceSource,
}

impl Relation {
    /// Creates a new materialized relation with `columns` over `tuples`. Fails if a tuple
    /// does not have one value per column.
    pub fn new<S, T, V, X>(columns: &[S], tuples: T) -> Result<Self>
    where
        S: AsRef<str>,
        T: IntoIterator<Item = V>,
        V: IntoIterator<Item = X>,
        X: Into<String>,
    {
        let schema = Schema::new(columns);
        let tuples = tuples
            .into_iter()
            .map(|t| checked(schema.len(), to_tuple(t)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_source(
            schema,
            SequenceSource::materialized(tuples, false),
        ))
    }

    /// Creates a new materialized relation with `columns` and no tuples.
    pub fn empty<S: AsRef<str>>(columns: &[S]) -> Self {
        Self::from_source(Schema::new(columns), SequenceSource::materialized(vec![], false))
    }

    /// Creates a new relation with `columns` over a one-shot `producer` of tuples. The
    /// producer is not consumed until the relation is iterated or materialized.
    ///
    /// A tuple that does not have one value per column fails with `ArityMismatch` when
    /// it is produced.
    pub fn streaming<S, I, V, X>(columns: &[S], producer: I) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = V>,
        I::IntoIter: 'static,
        V: IntoIterator<Item = X>,
        X: Into<String>,
    {
        let schema = Schema::new(columns);
        let arity = schema.len();
        let producer = producer
            .into_iter()
            .map(move |t| checked(arity, to_tuple(t)));
        Self::from_source(schema, SequenceSource::streaming(producer, false))
    }

    /// Creates a relation over an existing source. The tuples of `source` must conform
    /// to `schema`.
    pub(crate) fn from_source(schema: Schema, source: SequenceSource) -> Self {
        Self {
            name: None,
            schema,
            source,
        }
    }

    /// Creates an unnamed, one-shot relation over a lazy transformation of some sequence.
    pub(crate) fn derived<I>(schema: Schema, producer: I) -> Self
    where
        I: Iterator<Item = Result<Tuple>> + 'static,
    {
        Self::from_source(schema, SequenceSource::streaming(producer, false))
    }

    /// Consumes the receiver and returns it with the given `name`.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Returns the name of the receiver, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Consumes the receiver and returns it as a relation that can be iterated any number
    /// of times. The tuples are materialized on the first iteration.
    pub fn reusable(self) -> Self {
        Self {
            source: self.source.with_reuse(true),
            ..self
        }
    }

    /// Returns true if the receiver is materialized before every iteration.
    pub fn reuse(&self) -> bool {
        self.source.reuse()
    }

    /// Returns the schema of the receiver.
    #[inline(always)]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Materializes the receiver and returns its tuples.
    pub fn list(&self) -> Result<Rc<Vec<Tuple>>> {
        self.source.to_materialized()
    }

    /// Returns a lazy iterator over the tuples of the receiver.
    ///
    /// **Note**: unless the receiver is materialized or reusable, the iterator drains the
    /// receiver; iterating it again yields no tuples.
    pub fn iter(&self) -> Tuples {
        self.source.iterate()
    }

    /// Materializes the receiver and returns its tuples as records.
    pub fn record_list(&self) -> Result<Vec<Record>> {
        Ok(self
            .list()?
            .iter()
            .map(|t| Record::new(self.schema.clone(), t.clone()))
            .collect())
    }

    /// Returns a lazy iterator over the records of the receiver. Like [`iter`], it
    /// drains a one-shot receiver.
    ///
    /// [`iter`]: ./struct.Relation.html#method.iter
    pub fn records(&self) -> Records {
        Records {
            schema: self.schema.clone(),
            tuples: self.iter(),
        }
    }

    /// Materializes the receiver and returns the number of its tuples.
    pub fn size(&self) -> Result<usize> {
        Ok(self.list()?.len())
    }

    /// Appends `tuple` to the receiver, materializing it first.
    ///
    /// **Example**:
    /// ```rust
    /// use benchrel::{Error, Relation};
    ///
    /// let mut r = Relation::empty(&["mode", "iops"]);
    /// r.insert(vec!["read", "100"]).unwrap();
    ///
    /// assert_eq!(Err(Error::ArityMismatch { expected: 2, found: 1 }), r.insert(vec!["write"]));
    /// assert_eq!(1, r.size().unwrap());
    /// ```
    pub fn insert<V, X>(&mut self, tuple: V) -> Result<()>
    where
        V: IntoIterator<Item = X>,
        X: Into<String>,
    {
        let tuple = checked(self.schema.len(), to_tuple(tuple))?;
        self.source.update(|tuples| tuples.push(tuple))
    }

    /// Appends `tuples` to the receiver, materializing it first. If any of `tuples` has
    /// the wrong arity, nothing is appended.
    pub fn insert_list<T, V, X>(&mut self, tuples: T) -> Result<()>
    where
        T: IntoIterator<Item = V>,
        V: IntoIterator<Item = X>,
        X: Into<String>,
    {
        let arity = self.schema.len();
        let tuples = tuples
            .into_iter()
            .map(|t| checked(arity, to_tuple(t)))
            .collect::<Result<Vec<_>>>()?;
        self.source.update(|existing| existing.extend(tuples))
    }

    /// Renames column `old` of the receiver's schema to `new`. Records produced before
    /// the call keep the old name.
    pub fn rename_column(&mut self, old: &str, new: &str) -> Result<()> {
        self.schema.rename(old, new)
    }

    /// Returns a one-shot relation with the remaining tuples of the receiver followed by
    /// the remaining tuples of `other`. Both relations must have the same columns.
    pub fn concat(&self, other: &Relation) -> Result<Relation> {
        if self.schema.columns() != other.schema.columns() {
            return Err(Error::SchemaMismatch {
                left: self.schema.to_vec(),
                right: other.schema.to_vec(),
            });
        }
        Ok(Self::from_source(
            self.schema.clone(),
            self.source.concat(&other.source),
        ))
    }

    /// Materializes the receiver and returns its tuples, one per line.
    pub fn show(&self) -> Result<String> {
        Ok(self
            .list()?
            .iter()
            .map(|t| format!("({})", t.join(", ")))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("reuse", &self.reuse())
            .finish()
    }
}

/// Is the iterator over the records of a [`Relation`].
///
/// [`Relation`]: ./struct.Relation.html
pub struct Records {
    schema: Schema,
    tuples: Tuples,
}

impl Iterator for Records {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let schema = &self.schema;
        self.tuples
            .next()
            .map(|t| t.map(|t| Record::new(schema.clone(), t)))
    }
}

fn to_tuple<V, X>(values: V) -> Tuple
where
    V: IntoIterator<Item = X>,
    X: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

/// Returns `tuple` if it has `arity` values, or an `ArityMismatch` error.
pub(crate) fn checked(arity: usize, tuple: Tuple) -> Result<Tuple> {
    if tuple.len() == arity {
        Ok(tuple)
    } else {
        Err(Error::ArityMismatch {
            expected: arity,
            found: tuple.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, rc::Rc};

    pub(super) fn strings(tuples: &[&[&str]]) -> Vec<Tuple> {
        tuples
            .iter()
            .map(|t| t.iter().map(|v| v.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_new() {
        {
            let r = Relation::new(&["a", "b"], vec![vec!["1", "2"], vec!["3", "4"]]).unwrap();
            assert_eq!(&["a", "b"], r.schema().columns());
            assert_eq!(None, r.name());
            assert!(!r.reuse());
            assert_eq!(strings(&[&["1", "2"], &["3", "4"]]), *r.list().unwrap());
        }
        {
            let r = Relation::new(&["a", "b"], vec![vec!["1", "2"], vec!["3"]]);
            assert_eq!(
                Error::ArityMismatch {
                    expected: 2,
                    found: 1
                },
                r.unwrap_err()
            );
        }
        {
            let r = Relation::new(&["a"], vec![vec!["1"]]).unwrap().with_name("r");
            assert_eq!(Some("r"), r.name());
        }
    }

    #[test]
    fn test_empty() {
        let r = Relation::empty(&["a", "b"]);
        assert_eq!(&["a", "b"], r.schema().columns());
        assert_eq!(0, r.size().unwrap());
        assert_eq!(0, r.size().unwrap());
        assert!(!r.reuse());
    }

    #[test]
    fn test_streaming() {
        {
            let r = Relation::streaming(&["a"], vec![vec!["1"], vec!["2"]]);
            assert_eq!(2, r.iter().count());
            assert_eq!(0, r.iter().count());
            assert_eq!(Vec::<Tuple>::new(), *r.list().unwrap());
        }
        {
            let r = Relation::streaming(&["a"], vec![vec!["1"], vec!["2"]]);
            assert_eq!(2, r.size().unwrap());
            assert_eq!(2, r.iter().count());
            assert_eq!(2, r.iter().count());
        }
        {
            let r = Relation::streaming(&["a"], vec![vec!["1"], vec!["2", "3"]]);
            let mut iter = r.iter();
            assert_eq!(Some(Ok(vec!["1".to_string()])), iter.next());
            assert_eq!(
                Some(Err(Error::ArityMismatch {
                    expected: 1,
                    found: 2
                })),
                iter.next()
            );
        }
    }

    #[test]
    fn test_streaming_failure_is_kept() {
        let r = Relation::streaming(&["a"], vec![vec!["1"], vec!["2", "x"], vec!["3"]]);
        let error = Error::ArityMismatch {
            expected: 1,
            found: 2,
        };
        assert_eq!(Err(error.clone()), r.list());
        assert_eq!(Err(error.clone()), r.list());
        assert_eq!(Err(error.clone()), r.size());
        assert_eq!(Err(error.clone()), r.record_list());
        assert_eq!(vec![Err(error)], r.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_streaming_is_lazy() {
        let counter = Rc::new(Cell::new(0));
        let c = counter.clone();
        let r = Relation::streaming(
            &["a"],
            (0..5).map(move |i| {
                c.set(c.get() + 1);
                vec![i.to_string()]
            }),
        );
        assert_eq!(0, counter.get());
        r.iter().take(2).for_each(drop);
        assert_eq!(2, counter.get());
        assert_eq!(3, r.size().unwrap());
        assert_eq!(5, counter.get());
    }

    #[test]
    fn test_reusable() {
        let counter = Rc::new(Cell::new(0));
        let c = counter.clone();
        let r = Relation::streaming(
            &["a"],
            (0..3).map(move |i| {
                c.set(c.get() + 1);
                vec![i.to_string()]
            }),
        )
        .reusable();
        assert!(r.reuse());
        assert_eq!(3, r.records().count());
        assert_eq!(3, r.records().count());
        assert_eq!(3, counter.get());
    }

    #[test]
    fn test_records() {
        let r = Relation::new(&["a", "b"], vec![vec!["1", "2"]]).unwrap();
        let records = r.record_list().unwrap();
        assert_eq!(1, records.len());
        assert_eq!(&["a", "b"], records[0].schema().columns());
        assert_eq!(&["1", "2"], records[0].raw());
        assert_eq!(records, r.records().collect::<Result<Vec<_>>>().unwrap());
    }

    #[test]
    fn test_insert() {
        {
            let mut r = Relation::streaming(&["a", "b"], vec![vec!["1", "2"]]);
            r.insert(vec!["3", "4"]).unwrap();
            assert_eq!(strings(&[&["1", "2"], &["3", "4"]]), *r.list().unwrap());
        }
        {
            let mut r = Relation::new(&["a", "b"], vec![vec!["1", "2"]]).unwrap();
            assert_eq!(
                Err(Error::ArityMismatch {
                    expected: 2,
                    found: 3
                }),
                r.insert(vec!["3", "4", "5"])
            );
            assert_eq!(1, r.size().unwrap());
        }
        {
            let mut r = Relation::new(&["a"], vec![vec!["1"]]).unwrap();
            let snapshot = r.iter();
            r.insert(vec!["2"]).unwrap();
            assert_eq!(1, snapshot.count());
            assert_eq!(2, r.size().unwrap());
        }
    }

    #[test]
    fn test_insert_list() {
        {
            let mut r = Relation::new(&["a"], vec![vec!["1"]]).unwrap();
            r.insert_list(vec![vec!["2"], vec!["3"]]).unwrap();
            assert_eq!(strings(&[&["1"], &["2"], &["3"]]), *r.list().unwrap());
        }
        {
            let mut r = Relation::new(&["a"], vec![vec!["1"]]).unwrap();
            assert!(r.insert_list(vec![vec!["2"], vec![]]).is_err());
            assert_eq!(1, r.size().unwrap());
        }
    }

    #[test]
    fn test_rename_column() {
        {
            let mut r = Relation::new(&["a", "b"], vec![vec!["1", "2"]]).unwrap();
            let before = r.record_list().unwrap();
            r.rename_column("b", "c").unwrap();
            assert_eq!(&["a", "c"], r.schema().columns());
            assert_eq!(&["a", "c"], r.record_list().unwrap()[0].schema().columns());
            assert_eq!(&["a", "b"], before[0].schema().columns());
        }
        {
            let mut r = Relation::new(&["a"], vec![vec!["1"]]).unwrap();
            assert_eq!(
                Err(Error::MissingColumn { name: "x".into() }),
                r.rename_column("x", "y")
            );
        }
    }

    #[test]
    fn test_concat() {
        {
            let r = Relation::new(&["a"], vec![vec!["1"]]).unwrap();
            let s = Relation::streaming(&["a"], vec![vec!["2"], vec!["3"]]);
            let rs = r.concat(&s).unwrap();
            assert_eq!(strings(&[&["1"], &["2"], &["3"]]), *rs.list().unwrap());
            assert_eq!(0, s.iter().count());
            assert_eq!(1, r.iter().count());
        }
        {
            let r = Relation::new(&["a"], vec![vec!["1"]]).unwrap();
            let s = Relation::new(&["b"], vec![vec!["2"]]).unwrap();
            assert_eq!(
                Error::SchemaMismatch {
                    left: vec!["a".into()],
                    right: vec!["b".into()],
                },
                r.concat(&s).unwrap_err()
            );
        }
    }

    #[test]
    fn test_show() {
        let r = Relation::new(&["a", "b"], vec![vec!["1", "2"], vec!["3", "4"]]).unwrap();
        assert_eq!("(1, 2)\n(3, 4)", r.show().unwrap());
    }
}
