use crate::error::{GomodError, Result};
use crate::gomod::Requirement;
use tracing::debug;

/// How the modules to update are chosen from the candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Take every candidate without showing the selector.
    SelectAllNoConfirm,
    /// Ask the operator; optionally start with everything checked.
    Interactive { preselect_all: bool },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectOptions {
    pub preselect_all: bool,
}

/// Multi-select over a list of labels. Returns the confirmed indices;
/// an empty vector means the operator confirmed with nothing checked.
pub trait Selector {
    fn select(&mut self, labels: &[String], options: SelectOptions) -> Result<Vec<usize>>;
}

impl SelectionPolicy {
    pub fn apply(
        &self,
        candidates: &[Requirement],
        selector: &mut dyn Selector,
    ) -> Result<Vec<Requirement>> {
        match *self {
            SelectionPolicy::SelectAllNoConfirm => {
                debug!(count = candidates.len(), "selecting every candidate");
                Ok(candidates.to_vec())
            }
            SelectionPolicy::Interactive { preselect_all } => {
                let labels: Vec<String> = candidates.iter().map(Requirement::label).collect();
                let indices = selector.select(&labels, SelectOptions { preselect_all })?;
                debug!(selected = indices.len(), of = candidates.len(), "selection confirmed");

                indices
                    .into_iter()
                    .map(|idx| {
                        candidates.get(idx).cloned().ok_or_else(|| {
                            GomodError::Selection(format!(
                                "selector returned index {idx} for {} entries",
                                candidates.len()
                            ))
                        })
                    })
                    .collect()
            }
        }
    }
}
