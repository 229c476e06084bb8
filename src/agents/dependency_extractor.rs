use crate::gomod::{Manifest, Requirement};
use tracing::debug;

/// Candidates eligible for update, in declaration order. Indirect
/// requirements only qualify when `include_indirect` is set.
pub fn extract(manifest: &Manifest, include_indirect: bool) -> Vec<Requirement> {
    let candidates: Vec<Requirement> = manifest
        .requirements()
        .filter(|req| include_indirect || !req.indirect)
        .cloned()
        .collect();

    debug!(
        manifest = manifest.file(),
        candidates = candidates.len(),
        include_indirect,
        "extracted candidates"
    );
    candidates
}
