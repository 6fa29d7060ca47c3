/// Thread pool setup for the distance and clustering stages

/// Resolve a requested thread count; `0` means one per logical CPU.
pub fn resolve_threads(threads: usize) -> usize {
    if threads == 0 {
        num_cpus::get()
    } else {
        threads
    }
}

/// Install the global rayon pool. Returns the thread count in use.
pub fn configure_thread_pool(threads: usize) -> Result<usize, rayon::ThreadPoolBuildError> {
    let threads = resolve_threads(threads);

    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()?;

    Ok(threads)
}
