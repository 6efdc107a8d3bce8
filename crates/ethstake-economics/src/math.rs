//! Integer square root used by every reward denominator.

/// Returns `floor(sqrt(n))`, exact for every `u64`.
///
/// The floating point estimate only seeds the search. It is bumped by one so the
/// seed never sits below the true root, after which Newton's iteration
/// `x' = (x + n / x) / 2` decreases monotonically onto the floor root using
/// integer division only.
pub fn integer_sqrt(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }

    let mut x = (n as f64).sqrt() as u64 + 1;
    loop {
        let next = (x + n / x) / 2;
        if next >= x {
            return x;
        }
        x = next;
    }
}
