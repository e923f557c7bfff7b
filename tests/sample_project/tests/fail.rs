#[test]
fn runtime_condition() {
    if std::env::args().count() == 0 {
        sample_project::assert_unreachable!();
    }
}
