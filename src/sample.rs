//! Preview sampling over a field's value pool

use serde_json::Value;

/// The first `k` values of `pool`, optionally skipping repeats.
///
/// Asking for more values than the pool holds returns all of them.
pub fn take(pool: &[Value], k: usize, unique: bool) -> Vec<Value> {
    if !unique {
        return pool.iter().take(k).cloned().collect();
    }

    let mut picked: Vec<Value> = Vec::with_capacity(k.min(pool.len()));
    for value in pool {
        if picked.len() == k {
            break;
        }
        if !picked.contains(value) {
            picked.push(value.clone());
        }
    }
    picked
}
