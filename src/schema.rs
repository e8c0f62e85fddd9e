use crate::{Error, Result};
use std::{fmt, ops::Deref, rc::Rc};

/// Is the ordered list of column names of a relation. A schema is shared (by reference)
/// between a relation and the records it produces.
///
/// **Note**: column names are not required to be unique. Lookups return the first
/// matching position.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Schema {
    columns: Rc<Vec<String>>,
}

impl Schema {
    /// Creates a new schema with the given column names.
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        columns
            .iter()
            .map(|c| c.as_ref().to_string())
            .collect::<Vec<_>>()
            .into()
    }

    /// Returns the column names of the receiver.
    #[inline(always)]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the position of the first column named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the positions of `columns` in the receiver, in the order of `columns`.
    ///
    /// **Example**:
    /// ```rust
    /// use benchrel::{Error, Schema};
    ///
    /// let schema = Schema::new(&["pattern", "mode", "iops"]);
    ///
    /// assert_eq!(Ok(vec![2, 0]), schema.indexes_of(&["iops", "pattern"]));
    /// assert_eq!(
    ///     Err(Error::MissingColumn { name: "bps".into() }),
    ///     schema.indexes_of(&["bps"])
    /// );
    /// ```
    pub fn indexes_of<S: AsRef<str>>(&self, columns: &[S]) -> Result<Vec<usize>> {
        columns
            .iter()
            .map(|c| {
                let name = c.as_ref();
                self.index_of(name).ok_or_else(|| Error::MissingColumn {
                    name: name.to_string(),
                })
            })
            .collect()
    }

    /// Renames the first column named `old` to `new`. Other holders of the receiver's
    /// column list are not affected.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        let index = self.index_of(old).ok_or_else(|| Error::MissingColumn {
            name: old.to_string(),
        })?;
        Rc::make_mut(&mut self.columns)[index] = new.to_string();
        Ok(())
    }
}

impl From<Vec<String>> for Schema {
    fn from(columns: Vec<String>) -> Self {
        Self {
            columns: Rc::new(columns),
        }
    }
}

impl Deref for Schema {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.columns
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.columns.iter()).finish()
    }
}
