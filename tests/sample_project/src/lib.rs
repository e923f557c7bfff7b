//! A tiny crate with link-time reachability assertions, used as the project
//! under test by the reach-matrix integration tests.
//!
//! 一个带有链接期可达性断言的小型 crate，作为 reach-matrix 集成测试的被测项目。

/// Marks a point the optimizer must prove unreachable.
///
/// With the `static` feature and debug assertions off, the expansion refers
/// to a symbol that does not exist, so the build only links if the branch was
/// eliminated. Otherwise it is a plain `unreachable!()`.
///
/// ```ignore
/// if [0].is_empty() {
///     sample_project::assert_unreachable!();
/// }
/// ```
#[macro_export]
macro_rules! assert_unreachable {
    () => {
        $crate::__assert_unreachable_impl!()
    };
}

#[doc(hidden)]
#[macro_export]
#[cfg(all(feature = "static", not(debug_assertions)))]
macro_rules! __assert_unreachable_impl {
    () => {{
        extern "C" {
            #[link_name = "__sample_project_reached_unreachable__"]
            fn reached_unreachable() -> !;
        }
        unsafe { reached_unreachable() }
    }};
}

#[doc(hidden)]
#[macro_export]
#[cfg(any(not(feature = "static"), debug_assertions))]
macro_rules! __assert_unreachable_impl {
    () => {
        ::core::unreachable!()
    };
}

/// Identity function whose body is only visible to other crates under LTO.
///
/// `#[no_mangle]` keeps rustc from offering the body for cross-crate
/// inlining, while LTO can still import and inline it.
///
/// ```
/// assert_eq!(sample_project::grey_box(3), 3);
/// ```
#[no_mangle]
pub fn grey_box(v: i32) -> i32 {
    v
}

#[cfg(test)]
mod tests {
    #[test]
    #[allow(unreachable_code)]
    fn dead_code() {
        return;
        crate::assert_unreachable!();
    }

    #[test]
    #[should_panic]
    #[cfg(any(debug_assertions, not(feature = "static")))]
    fn checked_assertion_panics() {
        crate::assert_unreachable!();
    }

    #[test]
    fn grey_box_is_identity() {
        assert_eq!(super::grey_box(7), 7);
    }
}
