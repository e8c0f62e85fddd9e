use crate::{Result, Schema, Tuple};
use either::Either;
use std::fmt;

/// Is a tuple of values labelled by the schema of the relation that produced it.
///
/// Two records are equal if both their schemas (as sequences) and their values are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Record {
    schema: Schema,
    values: Tuple,
}

impl Record {
    /// Creates a new record. The length of `values` must be equal to the length of `schema`.
    pub(crate) fn new(schema: Schema, values: Tuple) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self { schema, values }
    }

    /// Returns the schema of the receiver.
    #[inline(always)]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the values of the receiver.
    #[inline(always)]
    pub fn raw(&self) -> &[String] {
        &self.values
    }

    /// Consumes the receiver and returns its values.
    #[inline(always)]
    pub fn into_raw(self) -> Tuple {
        self.values
    }

    /// Returns the number of values in the receiver.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Returns a new record with `columns` as its schema and the receiver's values at
    /// those columns, in the order of `columns`.
    ///
    /// **Example**:
    /// ```rust
    /// use benchrel::Relation;
    ///
    /// let r = Relation::new(&["pattern", "mode", "iops"], vec![vec!["rnd", "read", "120"]]).unwrap();
    /// let record = r.record_list().unwrap().remove(0);
    /// let key = record.get_key(&["mode", "pattern"]).unwrap();
    ///
    /// assert_eq!(&["mode", "pattern"], key.schema().columns());
    /// assert_eq!(&["read", "rnd"], key.raw());
    /// assert!(record.get_key(&["bps"]).is_err());
    /// ```
    pub fn get_key<S: AsRef<str>>(&self, columns: &[S]) -> Result<Record> {
        let indexes = self.schema.indexes_of(columns)?;
        Ok(Record::new(Schema::new(columns), self.pick(&indexes)))
    }

    /// Returns the value of a single column as a string, or the values of several columns
    /// as a list.
    ///
    /// **Example**:
    /// ```rust
    /// use benchrel::Relation;
    /// use either::Either;
    ///
    /// let r = Relation::new(&["nThreads", "response"], vec![vec!["4", "0.25"]]).unwrap();
    /// let record = r.record_list().unwrap().remove(0);
    ///
    /// assert_eq!(Either::Left("0.25"), record.get(&["response"]).unwrap());
    /// assert_eq!(Either::Right(vec!["0.25", "4"]), record.get(&["response", "nThreads"]).unwrap());
    /// ```
    pub fn get<S: AsRef<str>>(&self, columns: &[S]) -> Result<Either<&str, Vec<&str>>> {
        let indexes = self.schema.indexes_of(columns)?;
        if let [index] = indexes[..] {
            Ok(Either::Left(self.values[index].as_str()))
        } else {
            Ok(Either::Right(
                indexes.iter().map(|&i| self.values[i].as_str()).collect(),
            ))
        }
    }

    /// Returns the values of the receiver joined by commas.
    pub fn show(&self) -> String {
        self.values.join(",")
    }

    /// Returns the receiver's values at `indexes`.
    #[inline]
    pub(crate) fn pick(&self, indexes: &[usize]) -> Tuple {
        pick(&self.values, indexes)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.values.join(", "))
    }
}

/// Returns the values of `tuple` at `indexes`.
#[inline]
pub(crate) fn pick(tuple: &[String], indexes: &[usize]) -> Tuple {
    indexes.iter().map(|&i| tuple[i].clone()).collect()
}
