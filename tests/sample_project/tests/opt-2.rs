fn opaque<T>(value: T) -> T {
    unsafe {
        let ret = std::ptr::read_volatile(&value);
        std::mem::forget(value);
        ret
    }
}

// Needs reasoning across two comparisons (a < b < c implies a < c), which the
// O1 pipeline does not do.
#[test]
fn transitive_bounds() {
    let (a, b, c) = (opaque(1u32), opaque(2u32), opaque(3u32));
    if a < b && b < c && a >= c {
        sample_project::assert_unreachable!();
    }
}
