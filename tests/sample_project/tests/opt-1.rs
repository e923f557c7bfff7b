#[test]
fn constant_condition() {
    if [0].is_empty() {
        sample_project::assert_unreachable!();
    }
}
