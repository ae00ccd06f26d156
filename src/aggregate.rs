use std::collections::HashMap;

use tracing::debug;

use crate::cancel::CancelToken;
use crate::constants::pipeline::TOP_WORD_COUNT;
use crate::data::{FrequencyMap, RankedWord, TopKResult, Word};
use crate::errors::PipelineError;
use crate::tally::TallyPool;

/// Fold one partial map into the running total.
///
/// Summation per word is commutative and associative, so partials may arrive
/// in any worker-completion order without changing the total.
pub fn merge(total: &mut FrequencyMap, partial: FrequencyMap) {
    for (word, count) in partial {
        *total.entry(word).or_insert(0) += count;
    }
}

/// Rank the `k` highest-count words from a total map.
///
/// Words are bucketed by count, buckets are walked from the highest count
/// down, and within a bucket words are sorted ascending lexicographically
/// before selection. The bucket order is materialized explicitly: map
/// iteration order is never allowed to leak into the result, so identical
/// input always yields identical output. A bucket that would overflow `k`
/// contributes only its first `k - selected` words. The result is padded
/// with zero-valued entries up to exactly `k`.
pub fn top_k(total: &FrequencyMap, k: usize) -> TopKResult {
    let mut buckets: HashMap<u64, Vec<&Word>> = HashMap::new();
    for (word, count) in total {
        buckets.entry(*count).or_default().push(word);
    }

    let mut counts: Vec<u64> = buckets.keys().copied().collect();
    counts.sort_unstable_by(|a, b| b.cmp(a));

    let mut ranked = Vec::with_capacity(k);
    'selection: for count in counts {
        if let Some(mut words) = buckets.remove(&count) {
            words.sort_unstable();
            for word in words {
                if ranked.len() == k {
                    break 'selection;
                }
                ranked.push(RankedWord {
                    word: word.clone(),
                    count,
                });
            }
        }
    }
    while ranked.len() < k {
        ranked.push(RankedWord::zero());
    }
    TopKResult::from_ranked(ranked)
}

/// Aggregator stage: block until the tally stage's partial queue is drained
/// and closed, then rank the merged total.
///
/// This is the only stage that must wait for the whole upstream to finish;
/// the final ranking needs total counts, which do not exist until every
/// partial is merged. A forwarded stage error aborts the run with that
/// error and discards everything merged so far; a cancelled run surfaces as
/// `PipelineError::Cancelled` instead of hanging on a never-closed queue.
pub fn drain(mut pool: TallyPool, cancel: &CancelToken) -> Result<TopKResult, PipelineError> {
    let receiver = pool
        .take_receiver()
        .ok_or_else(|| PipelineError::Configuration("tally pool already drained".to_string()))?;
    let stats = pool.stats();

    let mut total = FrequencyMap::new();
    let mut failure: Option<PipelineError> = None;
    for item in receiver.iter() {
        match item {
            Ok(partial) => {
                if failure.is_none() {
                    merge(&mut total, partial);
                    stats.record_partial_merged();
                }
            }
            Err(err) => {
                cancel.cancel();
                if failure.is_none() {
                    failure = Some(err);
                }
            }
        }
    }
    // Queue closed: every worker has exited. Join them before deciding the
    // run outcome.
    drop(pool);

    if let Some(err) = failure {
        return Err(err);
    }
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }
    debug!(
        distinct_words = total.len(),
        partials = stats.partials_merged(),
        "aggregation complete"
    );
    Ok(top_k(&total, TOP_WORD_COUNT))
}
