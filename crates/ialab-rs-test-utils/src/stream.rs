use ialab_rs_protocol::StreamEvent;

/// Deltas for `parts`, with `finished` set on the last one.
pub fn reply_events(parts: &[&str]) -> Vec<StreamEvent> {
    let last = parts.len().saturating_sub(1);
    parts
        .iter()
        .enumerate()
        .map(|(idx, part)| {
            if idx == last {
                StreamEvent::finished(*part)
            } else {
                StreamEvent::delta(*part)
            }
        })
        .collect()
}

/// Let spawned background work run on a current-thread runtime.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
