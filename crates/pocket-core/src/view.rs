//! Pure projections over a task list: filtered/searched views and aggregate
//! counts. Nothing here is cached; every call derives from the slice it gets.

use crate::tasks::{Category, CategoryFilter, Task};

/// Filter + search applied to a task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub filter: CategoryFilter,
    /// Case-insensitive substring; empty matches everything.
    pub search: String,
}

impl TaskQuery {
    pub fn new(filter: CategoryFilter, search: impl Into<String>) -> Self {
        Self {
            filter,
            search: search.into(),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.filter.admits(task.category) && contains_ignore_case(&task.text, &self.search)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Tasks passing `query`, in collection order.
pub fn project<'a>(tasks: &'a [Task], query: &TaskQuery) -> Vec<&'a Task> {
    tasks.iter().filter(|task| query.matches(task)).collect()
}

/// Transient UI selections. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub filter: CategoryFilter,
    pub search: String,
    /// Category assigned to the next task the user adds.
    pub next_category: Category,
}

impl Selection {
    pub fn query(&self) -> TaskQuery {
        TaskQuery::new(self.filter, self.search.clone())
    }
}

/// Counts over the entire collection, independent of any filter or search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub work: usize,
    pub personal: usize,
    pub shopping: usize,
}

impl TaskStats {
    pub fn compute(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            if task.completed {
                stats.completed += 1;
            }
            match task.category {
                Category::Work => stats.work += 1,
                Category::Personal => stats.personal += 1,
                Category::Shopping => stats.shopping += 1,
            }
            stats
        })
    }

    pub fn for_category(&self, category: Category) -> usize {
        match category {
            Category::Work => self.work,
            Category::Personal => self.personal,
            Category::Shopping => self.shopping,
        }
    }

    pub fn pending(&self) -> usize {
        self.total - self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, category: Category, text: &str, completed: bool) -> Task {
        let mut task = Task::new(id.into(), text.into(), category, 0);
        task.completed = completed;
        task
    }

    fn sample() -> Vec<Task> {
        vec![
            task("1", Category::Work, "buy milk", false),
            task("2", Category::Personal, "call mom", true),
            task("3", Category::Shopping, "buy milk", false),
        ]
    }

    fn ids(view: &[&Task]) -> Vec<String> {
        view.iter().map(|t| t.id.to_string()).collect()
    }

    #[test]
    fn filter_by_category() {
        let tasks = sample();
        let view = project(&tasks, &TaskQuery::new(CategoryFilter::Only(Category::Work), ""));
        assert_eq!(ids(&view), ["1"]);
    }

    #[test]
    fn search_across_all_categories_keeps_order() {
        let tasks = sample();
        let view = project(&tasks, &TaskQuery::new(CategoryFilter::All, "milk"));
        assert_eq!(ids(&view), ["1", "3"]);
    }

    #[test]
    fn filter_and_search_are_combined() {
        let tasks = sample();
        let query = TaskQuery::new(CategoryFilter::Only(Category::Shopping), "milk");
        assert_eq!(ids(&project(&tasks, &query)), ["3"]);
    }

    #[test]
    fn search_ignores_case() {
        let tasks = sample();
        let view = project(&tasks, &TaskQuery::new(CategoryFilter::All, "CALL Mom"));
        assert_eq!(ids(&view), ["2"]);
    }

    #[test]
    fn default_query_returns_everything() {
        let tasks = sample();
        assert_eq!(project(&tasks, &TaskQuery::default()).len(), tasks.len());
        assert!(project(&[], &TaskQuery::default()).is_empty());
    }

    #[test]
    fn stats_cover_whole_collection() {
        let stats = TaskStats::compute(&sample());
        assert_eq!(
            stats,
            TaskStats {
                total: 3,
                completed: 1,
                work: 1,
                personal: 1,
                shopping: 1,
            }
        );
        assert_eq!(stats.pending(), 2);
        assert_eq!(stats.for_category(Category::Shopping), 1);
    }

    #[test]
    fn selection_defaults() {
        let selection = Selection::default();
        assert_eq!(selection.filter, CategoryFilter::All);
        assert_eq!(selection.next_category, Category::Work);
        assert_eq!(selection.query(), TaskQuery::default());
    }
}
