/// Seconds since the UNIX epoch as reported by the system clock
#[cfg(not(target_arch = "wasm32"))]
fn epoch_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Seconds since the UNIX epoch as reported by the browser
#[cfg(target_arch = "wasm32")]
fn epoch_secs() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|perf| (perf.time_origin() + perf.now()) / 1000.0)
        .unwrap_or(0.0)
}

/// Whole seconds since the UNIX epoch, used to stamp saved drawings
pub fn timestamp_secs() -> u64 {
    epoch_secs() as u64
}
