//! Stopwatch for the pass diagnostics.

/// Millisecond time source. Native builds use `std::time::Instant`; the
/// wasm bindings inject the browser clock.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

#[derive(Debug)]
pub struct SystemClock {
    #[cfg(not(target_arch = "wasm32"))]
    origin: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock {
            #[cfg(not(target_arch = "wasm32"))]
            origin: std::time::Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    // `Instant` is unavailable on wasm32-unknown-unknown.
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> f64 {
        0.0
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Timer {
    started: Option<f64>,
}

impl Timer {
    pub fn start(clock: &dyn Clock) -> Self {
        Timer { started: Some(clock.now_ms()) }
    }

    /// Milliseconds since `start`; a stopped timer reads zero.
    pub fn stop(&mut self, clock: &dyn Clock) -> f64 {
        self.started.take().map_or(0.0, |t0| clock.now_ms() - t0)
    }
}
