use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::{Duration, OffsetDateTime};

use super::ChecklistItemId;

/// How far ahead of the due date an item counts as "due soon".
const DUE_SOON_WINDOW: Duration = Duration::days(3);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ChecklistCategory {
    Documents,
    Packing,
    Booking,
    Health,
    Work,
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort weight: high outranks medium outranks low.
    pub fn weight(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

/// A trackable task belonging to a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: ChecklistItemId,
    pub title: String,
    pub description: String,
    pub category: ChecklistCategory,
    pub priority: Priority,
    pub completed: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    pub notes: String,
}

impl ChecklistItem {
    /// Incomplete and strictly past its due date.
    pub fn is_overdue(&self, now: OffsetDateTime) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }

    /// Incomplete and due within the next three days.
    ///
    /// Inclusive of `now`, so an item due exactly now is due-soon and
    /// never overdue at the same instant.
    pub fn is_due_soon(&self, now: OffsetDateTime) -> bool {
        !self.completed
            && self
                .due_date
                .is_some_and(|due| due >= now && due <= now + DUE_SOON_WINDOW)
    }

    /// The conventional five-item kickoff checklist. Creation leaves the
    /// checklist empty; callers that want the seed add these themselves.
    pub fn default_seed() -> Vec<NewChecklistItem> {
        vec![
            NewChecklistItem::new(
                "Check passport validity",
                ChecklistCategory::Documents,
                Priority::High,
            ),
            NewChecklistItem::new(
                "Arrange visa if required",
                ChecklistCategory::Documents,
                Priority::High,
            ),
            NewChecklistItem::new(
                "Book flights",
                ChecklistCategory::Booking,
                Priority::High,
            ),
            NewChecklistItem::new(
                "Book accommodation",
                ChecklistCategory::Booking,
                Priority::Medium,
            ),
            NewChecklistItem::new(
                "Pack luggage",
                ChecklistCategory::Packing,
                Priority::Low,
            ),
        ]
    }
}

/// Input for adding a checklist item. The id is generated by the store and
/// `completed` defaults to false unless the caller overrides it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChecklistItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: ChecklistCategory,
    pub priority: Priority,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub notes: String,
}

impl NewChecklistItem {
    pub fn new(
        title: impl Into<String>,
        category: ChecklistCategory,
        priority: Priority,
    ) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            category,
            priority,
            completed: None,
            due_date: None,
            notes: String::new(),
        }
    }

    pub fn with_due_date(mut self, due_date: OffsetDateTime) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn into_item(self, id: ChecklistItemId) -> ChecklistItem {
        ChecklistItem {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            priority: self.priority,
            completed: self.completed.unwrap_or(false),
            due_date: self.due_date,
            notes: self.notes,
        }
    }
}

/// Partial update for a checklist item. Completion has its own toggle
/// operation on the store, but can also be set here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<ChecklistCategory>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    pub notes: Option<String>,
}

impl ChecklistItemPatch {
    pub fn apply(self, item: &mut ChecklistItem) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(priority) = self.priority {
            item.priority = priority;
        }
        if let Some(completed) = self.completed {
            item.completed = completed;
        }
        if let Some(due_date) = self.due_date {
            item.due_date = Some(due_date);
        }
        if let Some(notes) = self.notes {
            item.notes = notes;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CompletionFilter {
    #[default]
    All,
    Completed,
    Pending,
}

/// Category and completion filters, combined with AND semantics.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistFilter {
    /// `None` means all categories.
    pub category: Option<ChecklistCategory>,
    #[serde(default)]
    pub completion: CompletionFilter,
}

impl ChecklistFilter {
    pub fn matches(&self, item: &ChecklistItem) -> bool {
        if self.category.is_some_and(|category| item.category != category) {
            return false;
        }
        match self.completion {
            CompletionFilter::All => true,
            CompletionFilter::Completed => item.completed,
            CompletionFilter::Pending => !item.completed,
        }
    }
}

/// The single active sort key for checklist views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ChecklistSortKey {
    #[default]
    Priority,
    Category,
    DueDate,
    Title,
}

pub fn filter_items(items: &[ChecklistItem], filter: &ChecklistFilter) -> Vec<ChecklistItem> {
    items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}

/// Stable sort by the selected key; no secondary tiebreak.
pub fn sort_items(items: &mut [ChecklistItem], key: ChecklistSortKey) {
    match key {
        ChecklistSortKey::Priority => {
            items.sort_by(|a, b| b.priority.weight().cmp(&a.priority.weight()));
        }
        ChecklistSortKey::Category => {
            items.sort_by(|a, b| a.category.to_string().cmp(&b.category.to_string()));
        }
        ChecklistSortKey::DueDate => {
            // Ascending, items without a due date last, two absent dates equal.
            items.sort_by(|a, b| match (a.due_date, b.due_date) {
                (Some(a_due), Some(b_due)) => a_due.cmp(&b_due),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }
        ChecklistSortKey::Title => {
            items.sort_by(|a, b| a.title.cmp(&b.title));
        }
    }
}

/// Partition items by category, categories in first-occurrence order.
pub fn group_by_category(
    items: Vec<ChecklistItem>,
) -> Vec<(ChecklistCategory, Vec<ChecklistItem>)> {
    let mut groups: Vec<(ChecklistCategory, Vec<ChecklistItem>)> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|(category, _)| *category == item.category) {
            Some((_, group)) => group.push(item),
            None => groups.push((item.category, vec![item])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn make_item(title: &str, category: ChecklistCategory, priority: Priority) -> ChecklistItem {
        NewChecklistItem::new(title, category, priority).into_item(ChecklistItemId::generate())
    }

    #[test]
    fn due_now_is_due_soon_not_overdue() {
        let now = datetime!(2025-06-01 12:00 UTC);
        let mut item = make_item("visa", ChecklistCategory::Documents, Priority::High);
        item.due_date = Some(now);

        assert!(item.is_due_soon(now));
        assert!(!item.is_overdue(now));
    }

    #[test]
    fn overdue_and_due_soon_are_disjoint() {
        let now = datetime!(2025-06-01 12:00 UTC);
        let mut item = make_item("visa", ChecklistCategory::Documents, Priority::High);

        item.due_date = Some(now - Duration::minutes(1));
        assert!(item.is_overdue(now));
        assert!(!item.is_due_soon(now));

        item.due_date = Some(now + DUE_SOON_WINDOW);
        assert!(item.is_due_soon(now));

        item.due_date = Some(now + DUE_SOON_WINDOW + Duration::minutes(1));
        assert!(!item.is_due_soon(now));
    }

    #[test]
    fn completed_items_are_never_time_classified() {
        let now = datetime!(2025-06-01 12:00 UTC);
        let mut item = make_item("visa", ChecklistCategory::Documents, Priority::High);
        item.due_date = Some(now - Duration::days(1));
        item.completed = true;

        assert!(!item.is_overdue(now));
        assert!(!item.is_due_soon(now));
    }

    #[test]
    fn filter_combines_category_and_completion() {
        let mut done = make_item("flights", ChecklistCategory::Booking, Priority::High);
        done.completed = true;
        let pending = make_item("hotel", ChecklistCategory::Booking, Priority::Medium);
        let other = make_item("passport", ChecklistCategory::Documents, Priority::High);
        let items = vec![done.clone(), pending.clone(), other];

        let filter = ChecklistFilter {
            category: Some(ChecklistCategory::Booking),
            completion: CompletionFilter::Pending,
        };
        let filtered = filter_items(&items, &filter);

        assert_eq!(filtered, vec![pending]);
    }

    #[test]
    fn priority_sort_is_descending() {
        let mut items = vec![
            make_item("a", ChecklistCategory::Other, Priority::Low),
            make_item("b", ChecklistCategory::Other, Priority::High),
            make_item("c", ChecklistCategory::Other, Priority::Medium),
        ];
        sort_items(&mut items, ChecklistSortKey::Priority);

        let priorities: Vec<_> = items.iter().map(|item| item.priority).collect();
        assert_eq!(priorities, vec![Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn category_sort_is_lexicographic() {
        let mut items = vec![
            make_item("a", ChecklistCategory::Work, Priority::Low),
            make_item("b", ChecklistCategory::Booking, Priority::Low),
            make_item("c", ChecklistCategory::Documents, Priority::Low),
            make_item("d", ChecklistCategory::Packing, Priority::Low),
        ];
        sort_items(&mut items, ChecklistSortKey::Category);

        let categories: Vec<_> = items.iter().map(|item| item.category).collect();
        assert_eq!(
            categories,
            vec![
                ChecklistCategory::Booking,
                ChecklistCategory::Documents,
                ChecklistCategory::Packing,
                ChecklistCategory::Work,
            ]
        );
    }

    #[test]
    fn title_sort_is_lexicographic() {
        let mut items = vec![
            make_item("pack shoes", ChecklistCategory::Packing, Priority::Low),
            make_item("book flights", ChecklistCategory::Booking, Priority::High),
            make_item("check passport", ChecklistCategory::Documents, Priority::High),
        ];
        sort_items(&mut items, ChecklistSortKey::Title);

        let titles: Vec<_> = items.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, vec!["book flights", "check passport", "pack shoes"]);
    }

    #[test]
    fn due_date_sort_puts_undated_last() {
        let now = datetime!(2025-06-01 12:00 UTC);
        let undated = make_item("undated", ChecklistCategory::Other, Priority::Low);
        let mut late = make_item("late", ChecklistCategory::Other, Priority::Low);
        late.due_date = Some(now + Duration::days(5));
        let mut early = make_item("early", ChecklistCategory::Other, Priority::Low);
        early.due_date = Some(now + Duration::days(1));

        let mut items = vec![undated.clone(), late.clone(), early.clone()];
        sort_items(&mut items, ChecklistSortKey::DueDate);

        assert_eq!(items, vec![early, late, undated]);
    }

    #[test]
    fn grouping_preserves_first_occurrence_order() {
        let items = vec![
            make_item("pack socks", ChecklistCategory::Packing, Priority::Low),
            make_item("passport", ChecklistCategory::Documents, Priority::High),
            make_item("pack shoes", ChecklistCategory::Packing, Priority::Low),
        ];
        let groups = group_by_category(items);

        let categories: Vec<_> = groups.iter().map(|(category, _)| *category).collect();
        assert_eq!(
            categories,
            vec![ChecklistCategory::Packing, ChecklistCategory::Documents]
        );
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn default_seed_is_five_incomplete_items() {
        let seed = ChecklistItem::default_seed();
        assert_eq!(seed.len(), 5);
        assert!(seed.iter().all(|item| item.completed.is_none()));
    }
}
