use crate::Tuple;

/// Skips the prefix of `slice` whose elements satisfy `cmp`, with exponentially growing
/// steps. `cmp` must be true for a (possibly empty) prefix of `slice` and false after it.
pub(crate) fn gallop<T>(mut slice: &[T], mut cmp: impl FnMut(&T) -> bool) -> &[T] {
    if !slice.is_empty() && cmp(&slice[0]) {
        let mut step = 1;
        while step < slice.len() && cmp(&slice[step]) {
            slice = &slice[step..];
            step <<= 1;
        }

        step >>= 1;
        while step > 0 {
            if step < slice.len() && cmp(&slice[step]) {
                slice = &slice[step..];
            }
            step >>= 1;
        }

        slice = &slice[1..];
    }
    slice
}

/// Merges `left` and `right`, both sorted on their first `arity` values (the key), and
/// calls `result` with the key and the remaining values of every pair of tuples with
/// equal keys.
pub(crate) fn join_helper(
    left: &[Tuple],
    right: &[Tuple],
    arity: usize,
    mut result: impl FnMut(&[String], &[String], &[String]),
) {
    let mut slice1 = left;
    let mut slice2 = right;

    while !slice1.is_empty() && !slice2.is_empty() {
        use std::cmp::Ordering;

        let key1 = &slice1[0][..arity];
        let key2 = &slice2[0][..arity];

        match key1.cmp(key2) {
            Ordering::Less => slice1 = gallop(slice1, |x| x[..arity] < *key2),
            Ordering::Equal => {
                let count1 = slice1.iter().take_while(|x| x[..arity] == *key1).count();
                let count2 = slice2.iter().take_while(|x| x[..arity] == *key2).count();

                for l in &slice1[..count1] {
                    for r in &slice2[..count2] {
                        result(key1, &l[arity..], &r[arity..]);
                    }
                }

                slice1 = &slice1[count1..];
                slice2 = &slice2[count2..];
            }
            Ordering::Greater => slice2 = gallop(slice2, |x| x[..arity] < *key1),
        }
    }
}

/// Returns the key (the first `arity` values) of the first tuple in `sorted` that has
/// the same key as its successor.
pub(crate) fn duplicate_key(sorted: &[Tuple], arity: usize) -> Option<&[String]> {
    sorted
        .windows(2)
        .find(|w| w[0][..arity] == w[1][..arity])
        .map(|w| &w[0][..arity])
}
