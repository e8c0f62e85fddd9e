/*! Implements [`SequenceSource`], the storage behind every [`Relation`].

A source is either a one-shot producer of tuples or a materialized list of tuples.
The only transition is from the former to the latter, and it happens at most once.

[`SequenceSource`]: ./struct.SequenceSource.html
[`Relation`]: ../struct.Relation.html
*/

use crate::{Error, Result, Tuple};
use std::{cell::RefCell, fmt, rc::Rc};

/// Is the type of producers wrapped by a streaming source.
type Producer = Box<dyn Iterator<Item = Result<Tuple>>>;

enum State {
    /// Tuples are pulled from the producer on demand; each tuple is seen once.
    Streaming(Producer),

    /// Tuples are stored and can be replayed any number of times.
    Materialized(Rc<Vec<Tuple>>),

    /// The producer failed while being materialized. Every later read returns the error.
    Failed(Error),
}

/// Is a sequence of tuples that is either produced once and consumed once, or
/// produced once and replayed many times.
///
/// A source created with `reuse` set to `true` is materialized right away, so that it can
/// be iterated repeatedly. Otherwise, iterating the source drains its producer and a second
/// iteration yields nothing, unless the source has been materialized in between.
///
/// **Example**:
/// ```rust
/// use benchrel::SequenceSource;
///
/// let once = SequenceSource::streaming((0..3).map(|i| Ok(vec![i.to_string()])), false);
/// assert_eq!(3, once.iterate().count());
/// assert_eq!(0, once.iterate().count());
///
/// let many = SequenceSource::streaming((0..3).map(|i| Ok(vec![i.to_string()])), true);
/// assert_eq!(3, many.iterate().count());
/// assert_eq!(3, many.iterate().count());
/// ```
pub struct SequenceSource {
    state: Rc<RefCell<State>>,
    reuse: bool,
}

impl SequenceSource {
    /// Creates a source over a list of tuples.
    pub fn materialized(tuples: Vec<Tuple>, reuse: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(State::Materialized(Rc::new(tuples)))),
            reuse,
        }
    }

    /// Creates a source over a one-shot producer. If `reuse` is true, the producer is
    /// drained immediately.
    ///
    /// **Note**: an error while draining the producer of a reuse source is not returned
    /// here; every iteration of the source returns it instead.
    pub fn streaming<I>(producer: I, reuse: bool) -> Self
    where
        I: Iterator<Item = Result<Tuple>> + 'static,
    {
        let source = Self {
            state: Rc::new(RefCell::new(State::Streaming(Box::new(producer)))),
            reuse,
        };
        if reuse {
            // a failure is kept in the state
            let _ = source.to_materialized();
        }
        source
    }

    /// Returns true if the receiver is materialized before every iteration.
    #[inline(always)]
    pub fn reuse(&self) -> bool {
        self.reuse
    }

    /// Returns a source sharing the receiver's state with the given `reuse` flag.
    /// The state is not materialized until the next iteration.
    pub(crate) fn with_reuse(self, reuse: bool) -> Self {
        Self {
            state: self.state,
            reuse,
        }
    }

    /// Drains the producer of the receiver (if not already drained) into a list, which
    /// replaces the producer permanently. Returns the list.
    ///
    /// If the producer fails, the receiver is failed for good: this and every later call
    /// return the error, and iterating the receiver yields only the error.
    pub fn to_materialized(&self) -> Result<Rc<Vec<Tuple>>> {
        let mut state = self.state.borrow_mut();
        let producer = match &mut *state {
            State::Materialized(tuples) => return Ok(tuples.clone()),
            State::Failed(e) => return Err(e.clone()),
            State::Streaming(producer) => {
                std::mem::replace(producer, Box::new(std::iter::empty::<Result<Tuple>>()))
            }
        };

        match producer.collect::<Result<Vec<_>>>() {
            Ok(tuples) => {
                let tuples = Rc::new(tuples);
                *state = State::Materialized(tuples.clone());

                #[cfg(feature = "tracing")]
                tracing::trace!(tuples = tuples.len(), "materialized sequence");

                Ok(tuples)
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %e, "failed to materialize sequence");

                *state = State::Failed(e.clone());
                Err(e)
            }
        }
    }

    /// Returns a lazy iterator over the content of the receiver.
    ///
    /// If the receiver is reused, it is materialized first. A materialized receiver is
    /// replayed from the start. Otherwise, the returned iterator pulls one tuple from the
    /// receiver's producer per call to `next`.
    pub fn iterate(&self) -> Tuples {
        if self.reuse {
            if let Err(e) = self.to_materialized() {
                return Tuples {
                    inner: Inner::Failed(Some(e)),
                };
            }
        }

        match &*self.state.borrow() {
            State::Materialized(tuples) => Tuples {
                inner: Inner::Replay {
                    tuples: tuples.clone(),
                    position: 0,
                },
            },
            State::Failed(e) => Tuples {
                inner: Inner::Failed(Some(e.clone())),
            },
            State::Streaming(_) => Tuples {
                inner: Inner::Pull {
                    state: self.state.clone(),
                    pulled: false,
                },
            },
        }
    }

    /// Returns a new one-shot source yielding what remains of the receiver followed by
    /// what remains of `other`. The result inherits the receiver's `reuse` flag.
    pub fn concat(&self, other: &SequenceSource) -> SequenceSource {
        Self::streaming(self.iterate().chain(other.iterate()), self.reuse)
    }

    /// Mutates the materialized list of the receiver, materializing it first.
    /// Iterators created before the call are unaffected.
    pub(crate) fn update<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Tuple>),
    {
        self.to_materialized()?;
        if let State::Materialized(tuples) = &mut *self.state.borrow_mut() {
            f(Rc::make_mut(tuples));
        }
        Ok(())
    }
}

impl fmt::Debug for SequenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceSource")
            .field("reuse", &self.reuse)
            .finish()
    }
}

enum Inner {
    Replay {
        tuples: Rc<Vec<Tuple>>,
        position: usize,
    },
    Pull {
        state: Rc<RefCell<State>>,
        pulled: bool,
    },
    Failed(Option<Error>),
}

/// Is the iterator over the tuples of a [`SequenceSource`].
///
/// [`SequenceSource`]: ./struct.SequenceSource.html
pub struct Tuples {
    inner: Inner,
}

impl Iterator for Tuples {
    type Item = Result<Tuple>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Replay { tuples, position } => {
                let tuple = tuples.get(*position)?.clone();
                *position += 1;
                Some(Ok(tuple))
            }
            Inner::Pull { state, pulled } => {
                let next = match &mut *state.borrow_mut() {
                    State::Streaming(producer) => producer.next(),
                    // materialized by another holder: the remaining tuples belong to it
                    State::Materialized(_) | State::Failed(_) => None,
                };

                if next.is_none() && !*pulled {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("read from an exhausted sequence");
                }

                *pulled = true;
                next
            }
            Inner::Failed(error) => error.take().map(Err),
        }
    }
}
