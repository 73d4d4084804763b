use soroban_sdk::{contracttype, Env, Vec};

use crate::DataKey;

/// A value captured for a checkpoint just before it was first changed
/// after that checkpoint was created.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Checkpointed {
    pub checkpoint_id: u32,
    pub value: i128,
}

/// Id of the most recently created checkpoint (0 before the first one).
pub fn current_id(env: &Env) -> u32 {
    env.storage()
        .persistent()
        .get(&DataKey::CheckpointId)
        .unwrap_or(0)
}

/// Record `value` against the current checkpoint unless that checkpoint
/// already has an entry. Call with the pre-change value before every write.
pub fn record(env: &Env, history_key: &DataKey, value: i128) {
    let current = current_id(env);
    if current == 0 {
        return;
    }
    let mut history: Vec<Checkpointed> = env
        .storage()
        .persistent()
        .get(history_key)
        .unwrap_or_else(|| Vec::new(env));
    if let Some(last) = history.last() {
        if last.checkpoint_id == current {
            return;
        }
    }
    history.push_back(Checkpointed {
        checkpoint_id: current,
        value,
    });
    env.storage().persistent().set(history_key, &history);
}

/// Value as of `checkpoint_id`. The first history entry at or after the
/// requested id holds it; with no such entry the live value still applies.
/// Checkpoint 0 predates every balance and always reads 0.
pub fn value_at(env: &Env, history_key: &DataKey, checkpoint_id: u32, live: i128) -> i128 {
    if checkpoint_id == 0 {
        return 0;
    }
    let history: Vec<Checkpointed> = env
        .storage()
        .persistent()
        .get(history_key)
        .unwrap_or_else(|| Vec::new(env));

    let mut lo = 0u32;
    let mut hi = history.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if history.get_unchecked(mid).checkpoint_id < checkpoint_id {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    if lo < history.len() {
        history.get_unchecked(lo).value
    } else {
        live
    }
}
