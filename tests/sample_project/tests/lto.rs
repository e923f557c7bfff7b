#[test]
fn cross_crate_call() {
    if sample_project::grey_box(1) == 0 {
        sample_project::assert_unreachable!();
    }
}
