use rand::Rng;

/// Fisher-Yates shuffle
///
/// Walks from the last element down to index 1 and swaps each element with one
/// drawn uniformly from `[0, i]`. `gen_range` samples without modulo bias, so
/// every permutation is equally likely.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0, i + 1);
        items.swap(i, j);
    }
}

/// Uniformly picks an index into a collection of `len` elements
pub fn pick_index<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(rng.gen_range(0, len))
}
