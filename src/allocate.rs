use anyhow::anyhow;
use lira_backend::{allocate, AllocError, Allocation, Config};
use lira_common::lir::Method;
use log::debug;

/// Allocate every method, spreading them over `jobs` threads. Results are in the order of `methods`.
pub fn allocate_all(
    methods: &[Method],
    config: &Config,
    jobs: usize,
) -> anyhow::Result<Vec<Result<Allocation, AllocError>>> {
    let jobs = jobs.clamp(1, methods.len().max(1));
    if jobs == 1 {
        return Ok(allocate_chunk(methods, config));
    }

    let size = (methods.len() + jobs - 1) / jobs;
    debug!("allocating {} methods on {jobs} threads", methods.len());

    let res = crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = methods
            .chunks(size)
            .map(|chunk| scope.spawn(move |_| allocate_chunk(chunk, config)))
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Result<Vec<_>, _>>()
    });

    match res {
        Ok(Ok(chunks)) => Ok(chunks.into_iter().flatten().collect()),
        _ => Err(anyhow!("an allocation thread panicked")),
    }
}

fn allocate_chunk(methods: &[Method], config: &Config) -> Vec<Result<Allocation, AllocError>> {
    methods.iter().map(|method| allocate(method, config)).collect()
}
