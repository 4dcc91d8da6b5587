/*!
 * Batch planning for pending translations.
 *
 * Packs cache-missed unique texts into bounded batches so one backend call
 * carries as much work as its character and item budgets allow.
 */

/// One unique text awaiting translation
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry {
    /// The canonical text to translate
    pub text: String,

    /// Original input indices resolved by this entry
    pub indexes: Vec<usize>,

    /// Composite cache key for the write-through after translation
    pub cache_key: String,
}

/// Pack pending entries into batches bounded by `max_chars` cumulative
/// characters and `max_items` entries.
///
/// Greedy left-to-right packing: deterministic, order-preserving, no
/// backtracking. A single entry longer than `max_chars` still gets its own
/// batch; entries are never dropped or split.
pub fn plan_batches(
    entries: Vec<PendingEntry>,
    max_chars: usize,
    max_items: usize,
) -> Vec<Vec<PendingEntry>> {
    let mut batches: Vec<Vec<PendingEntry>> = Vec::new();
    let mut current: Vec<PendingEntry> = Vec::new();
    let mut char_count = 0usize;

    for entry in entries {
        let entry_len = entry.text.chars().count();
        if !current.is_empty() && (char_count + entry_len > max_chars || current.len() >= max_items) {
            batches.push(std::mem::take(&mut current));
            char_count = 0;
        }
        char_count += entry_len;
        current.push(entry);
    }
    if !current.is_empty() {
        batches.push(current);
    }

    batches
}
