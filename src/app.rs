use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::{Settings, TitleLists};
use crate::console::Operator;
use crate::domain::{Category, RunMode};
use crate::error::EpgError;
use crate::guide::{self, GuideOptions, GuideReport};
use crate::reconcile::{ReconcileReport, Reconciler, RemovalPolicy};
use crate::store::CacheStore;
use crate::tmdb::MetadataProvider;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResult {
    pub reconcile: ReconcileReport,
    pub guide: GuideReport,
}

#[derive(Debug, Clone, Serialize)]
pub enum RunResult {
    Guides(Vec<CategoryResult>),
    Cleared { removed: usize },
    DeletedItem { name: Option<String> },
}

pub struct App<P: MetadataProvider> {
    store: CacheStore,
    provider: P,
    settings: Settings,
}

impl<P: MetadataProvider> App<P> {
    pub fn new(store: CacheStore, provider: P, settings: Settings) -> Self {
        Self {
            store,
            provider,
            settings,
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn run(
        &self,
        mode: RunMode,
        lists: &TitleLists,
        operator: &mut dyn Operator,
        now: DateTime<Utc>,
    ) -> Result<RunResult, EpgError> {
        match mode {
            RunMode::ClearCache => self.clear_cache(operator),
            RunMode::DeleteCachedItem => self.delete_cached_item(operator),
            RunMode::SeriesOnly | RunMode::MoviesOnly | RunMode::Both => {
                let mut results = Vec::new();
                for &category in mode.categories() {
                    results.push(self.refresh(category, lists.for_category(category), operator, now)?);
                }
                Ok(RunResult::Guides(results))
            }
        }
    }

    /// Reconcile one category against its list, then write its guide.
    pub fn refresh(
        &self,
        category: Category,
        titles: &[String],
        operator: &mut dyn Operator,
        now: DateTime<Utc>,
    ) -> Result<CategoryResult, EpgError> {
        let policy = RemovalPolicy::for_operator(operator);
        let reconcile = Reconciler::new(&self.store, &self.provider).reconcile(
            category,
            titles,
            policy,
            operator,
        )?;
        let options = GuideOptions::new(category, &self.settings, now);
        let output = self.settings.paths.guide(category);
        let guide = guide::emit(&self.store, &output, titles, &options)?;
        Ok(CategoryResult { reconcile, guide })
    }

    /// Remove every cached record after confirmation.
    pub fn clear_cache(&self, operator: &mut dyn Operator) -> Result<RunResult, EpgError> {
        let total = self.store.count()?;
        if total == 0 {
            operator.say("No items in cache.");
            return Ok(RunResult::Cleared { removed: 0 });
        }
        let confirmed = operator
            .ask(&format!("Delete all {total} cached items? (y/n): "))
            .is_some_and(|answer| answer.trim().eq_ignore_ascii_case("y"));
        if !confirmed {
            info!("Kept all {total} cached items.");
            return Ok(RunResult::Cleared { removed: 0 });
        }
        let removed = self.store.clear()?;
        info!("Deleted all {removed} items from cache.");
        operator.say(&format!("Deleted {removed} items from cache."));
        Ok(RunResult::Cleared { removed })
    }

    /// List cached TV shows then movies and delete the one the operator picks.
    pub fn delete_cached_item(&self, operator: &mut dyn Operator) -> Result<RunResult, EpgError> {
        let mut entries = Vec::new();
        for category in Category::ALL {
            for name in self.store.list(category)? {
                entries.push((name, category));
            }
        }
        if entries.is_empty() {
            operator.say("No items in cache.");
            return Ok(RunResult::DeletedItem { name: None });
        }

        let mut current = None;
        for (idx, (name, category)) in entries.iter().enumerate() {
            if current != Some(*category) {
                operator.say(match category {
                    Category::Series => "TV Shows in cache:",
                    Category::Movie => "Movies in cache:",
                });
                current = Some(*category);
            }
            operator.say(&format!("{}. {name} ({category})", idx + 1));
        }

        let Some(answer) =
            operator.ask("Enter the number of the item to delete or 'skip' to skip: ")
        else {
            return Ok(RunResult::DeletedItem { name: None });
        };
        let answer = answer.trim().to_lowercase();
        if answer.is_empty() || answer == "skip" {
            return Ok(RunResult::DeletedItem { name: None });
        }

        let selected = answer
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| entries.get(index));
        let Some((name, category)) = selected else {
            operator.say("Invalid input. Please enter a listed number or 'skip'.");
            return Ok(RunResult::DeletedItem { name: None });
        };

        self.store.delete(name, *category)?;
        let message = match category {
            Category::Series => format!("Deleted {name} from TV cache."),
            Category::Movie => format!("Deleted {name} from Movie cache."),
        };
        info!("{message}");
        operator.say(&message);
        Ok(RunResult::DeletedItem {
            name: Some(name.clone()),
        })
    }
}
