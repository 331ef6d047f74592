//! Keeps the cache in step with a curated title list.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use crate::console::Operator;
use crate::domain::Category;
use crate::error::EpgError;
use crate::select;
use crate::store::CacheStore;
use crate::tmdb::{MetadataProvider, find_candidates};

/// What happens to cached titles that are no longer listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    /// Ask the operator about each one; only "y" deletes.
    Confirm,
    /// Keep them without asking.
    Retain,
}

impl RemovalPolicy {
    pub fn for_operator(operator: &dyn Operator) -> Self {
        if operator.is_interactive() {
            RemovalPolicy::Confirm
        } else {
            RemovalPolicy::Retain
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub category: String,
    pub added: Vec<String>,
    pub unresolved: Vec<String>,
    pub removed: Vec<String>,
    pub kept: Vec<String>,
}

impl ReconcileReport {
    pub fn writes(&self) -> usize {
        self.added.len() + self.removed.len()
    }
}

pub struct Reconciler<'a, P: MetadataProvider + ?Sized> {
    store: &'a CacheStore,
    provider: &'a P,
}

impl<'a, P: MetadataProvider + ?Sized> Reconciler<'a, P> {
    pub fn new(store: &'a CacheStore, provider: &'a P) -> Self {
        Self { store, provider }
    }

    pub fn reconcile(
        &self,
        category: Category,
        titles: &[String],
        policy: RemovalPolicy,
        operator: &mut dyn Operator,
    ) -> Result<ReconcileReport, EpgError> {
        let desired: BTreeSet<String> = titles.iter().cloned().collect();
        let existing = self.store.list(category)?;

        let mut report = ReconcileReport {
            category: category.to_string(),
            ..ReconcileReport::default()
        };

        for name in desired.difference(&existing) {
            info!("New {} detected in list: {name}", category.noun());
            operator.say(&format!("Fetching information for new {}: {name}", category.noun()));
            let Some(candidates) = find_candidates(self.provider, name, category) else {
                info!("Left {name} uncached, no match found");
                report.unresolved.push(name.clone());
                continue;
            };
            let record = select::resolve(&candidates, name, category, operator);
            self.store.put(name, category, &record)?;
            info!("Cached {name} as \"{}\" ({category})", record.title);
            report.added.push(name.clone());
        }

        for name in existing.difference(&desired) {
            if self.confirm_removal(name, policy, operator) {
                self.store.delete(name, category)?;
                info!("Deleted {name} from cache.");
                report.removed.push(name.clone());
            } else {
                info!("Kept {name} in cache.");
                report.kept.push(name.clone());
            }
        }

        Ok(report)
    }

    fn confirm_removal(
        &self,
        name: &str,
        policy: RemovalPolicy,
        operator: &mut dyn Operator,
    ) -> bool {
        match policy {
            RemovalPolicy::Retain => false,
            RemovalPolicy::Confirm => operator
                .ask(&format!(
                    "{name} was removed from the list. Do you want to remove it from the cache? (y/n): "
                ))
                .is_some_and(|answer| answer.trim().eq_ignore_ascii_case("y")),
        }
    }
}
