//! Row-band partitioning for data-parallel transforms.
//!
//! Transforms never spawn work themselves. They hand their destination
//! storage to a [`Partitioner`], which splits it into contiguous bands of
//! whole rows and runs a body once per band. Each body receives exclusive
//! mutable access to its own rows only, so bands can never write the same
//! byte.

use std::ops::Range;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// Splits a row-major byte buffer into bands and runs a body per band.
///
/// Implementations must call `body` with disjoint, contiguous row ranges
/// that together cover `[0, data.len() / row_len)`, pass exactly the bytes
/// of those rows, and return only after every call finished. When several
/// bands fail, the error of the lowest-indexed band is returned.
pub trait Partitioner {
    fn run_bands<F>(&self, data: &mut [u8], row_len: usize, body: F) -> Result<(), TransformError>
    where
        F: Fn(Range<usize>, &mut [u8]) -> Result<(), TransformError> + Send + Sync;
}

/// Controls how transforms spread their rows across workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// Run every row on the calling thread as a single band.
    Serial,

    /// Use the global Rayon pool, one band per pool thread.
    #[default]
    Parallel,

    /// Run on a dedicated pool with `n` workers and `n` bands.
    ///
    /// A new pool is built on every call.
    Fixed(usize),
}

impl Partitioner for ExecutionStrategy {
    fn run_bands<F>(&self, data: &mut [u8], row_len: usize, body: F) -> Result<(), TransformError>
    where
        F: Fn(Range<usize>, &mut [u8]) -> Result<(), TransformError> + Send + Sync,
    {
        if row_len == 0 {
            return Ok(());
        }
        let rows = data.len() / row_len;

        match *self {
            ExecutionStrategy::Serial => body(0..rows, &mut data[..rows * row_len]),
            ExecutionStrategy::Parallel => {
                run_banded(data, row_len, rayon::current_num_threads(), &body)
            }
            ExecutionStrategy::Fixed(n) => {
                if n == 0 {
                    return Err(TransformError::InvalidWorkerCount(n));
                }
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| TransformError::WorkerPool(e.to_string()))?;

                pool.install(|| run_banded(data, row_len, n, &body))
            }
        }
    }
}

/// Split `data` into at most `workers` bands and run them on the current pool.
fn run_banded<F>(
    data: &mut [u8],
    row_len: usize,
    workers: usize,
    body: &F,
) -> Result<(), TransformError>
where
    F: Fn(Range<usize>, &mut [u8]) -> Result<(), TransformError> + Send + Sync,
{
    let rows = data.len() / row_len;
    let rows_per_band = rows.div_ceil(workers.max(1)).max(1);
    log::trace!(
        "partitioning {} rows into bands of {} rows",
        rows,
        rows_per_band
    );

    let results: Vec<Result<(), TransformError>> = data[..rows * row_len]
        .par_chunks_mut(rows_per_band * row_len)
        .enumerate()
        .map(|(band, chunk)| {
            let start = band * rows_per_band;
            let end = start + chunk.len() / row_len;
            body(start..end, chunk)
        })
        .collect();

    // Results are in band order, so this yields the first failing band.
    results.into_iter().collect()
}

/// Partitioners used by tests to shake out ordering assumptions.
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Runs one row per band, last band first.
    pub(crate) struct ReversedRows;

    impl Partitioner for ReversedRows {
        fn run_bands<F>(
            &self,
            data: &mut [u8],
            row_len: usize,
            body: F,
        ) -> Result<(), TransformError>
        where
            F: Fn(Range<usize>, &mut [u8]) -> Result<(), TransformError> + Send + Sync,
        {
            let mut first_err = None;
            for (row, band) in data.chunks_exact_mut(row_len).enumerate().rev() {
                if let Err(e) = body(row..row + 1, band) {
                    first_err = Some(e);
                }
            }
            first_err.map_or(Ok(()), Err)
        }
    }
}
