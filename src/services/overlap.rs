/// Whether the closed intervals `[start_a, end_a]` and `[start_b, end_b]` intersect.
///
/// Only strictly disjoint intervals are reported as free, so two meetings that
/// share an endpoint (one ends at 10:00, the next starts at 10:00) overlap.
pub fn has_overlap<T: PartialOrd>(start_a: T, end_a: T, start_b: T, end_b: T) -> bool {
    !(end_a < start_b || end_b < start_a)
}
