fn opaque<T>(value: T) -> T {
    unsafe {
        let ret = std::ptr::read_volatile(&value);
        std::mem::forget(value);
        ret
    }
}

#[test]
fn volatile_read() {
    if opaque(Some(1)) == Some(0) {
        sample_project::assert_unreachable!();
    }
}
