use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use tracing::debug;

/// Worker pool for CPU-bound batches whose items share no mutable state.
pub struct JobSystem {
    pool: ThreadPool,
}

impl JobSystem {
    pub fn new(num_threads: Option<usize>) -> Result<Self, ThreadPoolBuildError> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|index| format!("canyon-job-{index}"));
        if let Some(count) = num_threads {
            builder = builder.num_threads(count.max(1));
        }

        let pool = builder.build()?;
        debug!("job system started with {} threads", pool.current_num_threads());
        Ok(Self { pool })
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `job` over every item on the pool and returns the results in input order.
    pub fn map_ordered<T, R, F>(&self, items: Vec<T>, job: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        self.pool
            .install(|| items.into_par_iter().map(|item| job(item)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::JobSystem;

    #[test]
    fn map_ordered_keeps_input_order() {
        let jobs = JobSystem::new(Some(3)).expect("build pool");
        assert_eq!(jobs.thread_count(), 3);

        let input: Vec<u32> = (0..64).collect();
        let output = jobs.map_ordered(input.clone(), |value| value * 2);
        let expected: Vec<u32> = input.iter().map(|value| value * 2).collect();
        assert_eq!(output, expected);
    }

    #[test]
    fn zero_threads_is_raised_to_one() {
        let jobs = JobSystem::new(Some(0)).expect("build pool");
        assert_eq!(jobs.thread_count(), 1);
    }
}
