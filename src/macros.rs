#[macro_export]
macro_rules! wrapper {
    // Single expression (like a function name or closure)
    ($f:expr) => {{
        $f()
    }};
    ($f:expr, $( $args:expr $(,)? )* ) => {{
        $f( $($args,)* )
    }};
}

/// Retries the wrapped call with exponential backoff (5s, 10s, 20s, then gives up).
/// Used for the external polygon and land-price providers, which may be flaky.
#[macro_export]
macro_rules! retry {
    ($( $args:expr$(,)? )+) => {{
        let mut wait: u64 = 5;
        loop {
            let res = $crate::wrapper!($( $args, )*);
            if res.is_ok() {
                break res;
            }
            if wait <= 20 {
                std::thread::sleep(std::time::Duration::from_secs(wait));
                wait *= 2;
                continue;
            }
            break res;
        }
    }};
}
