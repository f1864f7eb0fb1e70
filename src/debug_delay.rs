/// Injects random jitter into the per-word atomic operations, shaking out
/// more possible interleavings under test. Compiles to nothing unless the
/// `runtime_validation` feature is enabled.
pub(crate) fn debug_delay() {
    #[cfg(feature = "runtime_validation")]
    {
        use std::thread;
        use std::time::Duration;

        use rand::{thread_rng, Rng};

        let mut rng = thread_rng();

        match rng.gen_range(0..100) {
            0..=94 => thread::yield_now(),
            _ => thread::sleep(Duration::from_micros(100)),
        }
    }
}
