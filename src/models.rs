use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Workspace {
    Personal,
    Work,
}

impl Workspace {
    pub const ALL: [Workspace; 2] = [Workspace::Personal, Workspace::Work];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Work => "work",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Personal => "Personal",
            Self::Work => "Work",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "personal" => Some(Self::Personal),
            "work" => Some(Self::Work),
            _ => None,
        }
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority labels as they appear in the select options of both databases.
///
/// Ordering follows urgency: `MuyAlta` is the greatest value and `Delegar` the least.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "MUY ALTA")]
    MuyAlta,
    #[serde(rename = "Alta")]
    Alta,
    #[serde(rename = "Media")]
    Media,
    #[serde(rename = "Baja")]
    Baja,
    #[serde(rename = "Delegar")]
    Delegar,
}

impl Priority {
    pub const ALL: [Priority; 5] = [
        Priority::MuyAlta,
        Priority::Alta,
        Priority::Media,
        Priority::Baja,
        Priority::Delegar,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MuyAlta => "MUY ALTA",
            Self::Alta => "Alta",
            Self::Media => "Media",
            Self::Baja => "Baja",
            Self::Delegar => "Delegar",
        }
    }

    /// Exact, case-sensitive match against the five known labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|priority| priority.as_str() == label)
    }

    fn urgency(self) -> u8 {
        match self {
            Self::MuyAlta => 4,
            Self::Alta => 3,
            Self::Media => 2,
            Self::Baja => 1,
            Self::Delegar => 0,
        }
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.urgency().cmp(&other.urgency())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub done: bool,
    pub due_date: Option<String>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
    pub workspace: Workspace,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoInput {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<Priority>,
}

/// Partial update. Absent or empty values mean "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TodoUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<Priority>,
}

impl TodoUpdate {
    pub fn due_date(date: impl Into<String>) -> Self {
        Self {
            due_date: Some(date.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CreateOutcome {
    #[serde(rename_all = "camelCase")]
    Created { page_id: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTodo {
    pub title: String,
    pub workspace: Workspace,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<Priority>,
}

impl ParsedTodo {
    pub fn into_create_input(self) -> (Workspace, CreateTodoInput) {
        (
            self.workspace,
            CreateTodoInput {
                title: self.title,
                description: self.description,
                due_date: self.due_date,
                priority: self.priority,
            },
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TodoFilter {
    #[default]
    All,
    Personal,
    Work,
}

impl TodoFilter {
    pub const ALL: [TodoFilter; 3] = [TodoFilter::All, TodoFilter::Personal, TodoFilter::Work];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Personal => "personal",
            Self::Work => "work",
        }
    }

    pub fn workspace(self) -> Option<Workspace> {
        match self {
            Self::All => None,
            Self::Personal => Some(Workspace::Personal),
            Self::Work => Some(Workspace::Work),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TodoDateGroup {
    Past,
    Today,
    Tomorrow,
    #[serde(rename = "Next Week")]
    NextWeek,
    Later,
    #[serde(rename = "No Date")]
    NoDate,
}

impl TodoDateGroup {
    /// Display order of the buckets.
    pub const ORDER: [TodoDateGroup; 6] = [
        TodoDateGroup::Past,
        TodoDateGroup::Today,
        TodoDateGroup::Tomorrow,
        TodoDateGroup::NextWeek,
        TodoDateGroup::Later,
        TodoDateGroup::NoDate,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Past => "Past",
            Self::Today => "Today",
            Self::Tomorrow => "Tomorrow",
            Self::NextWeek => "Next Week",
            Self::Later => "Later",
            Self::NoDate => "No Date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoGroup {
    pub group: TodoDateGroup,
    pub todos: Vec<Todo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceFailure {
    pub workspace: Workspace,
    pub message: String,
}

/// Merged result of loading every workspace at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoLoad {
    pub todos: Vec<Todo>,
    pub failures: Vec<WorkspaceFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_by_urgency() {
        assert!(Priority::MuyAlta > Priority::Alta);
        assert!(Priority::Alta > Priority::Media);
        assert!(Priority::Media > Priority::Baja);
        assert!(Priority::Baja > Priority::Delegar);
        let mut sorted = vec![Priority::Baja, Priority::MuyAlta, Priority::Delegar];
        sorted.sort();
        assert_eq!(sorted, vec![Priority::Delegar, Priority::Baja, Priority::MuyAlta]);
    }

    #[test]
    fn priority_labels_are_case_sensitive() {
        assert_eq!(Priority::from_label("MUY ALTA"), Some(Priority::MuyAlta));
        assert_eq!(Priority::from_label("muy alta"), None);
        assert_eq!(Priority::from_label("Urgent"), None);
        assert_eq!(
            serde_json::to_value(Priority::MuyAlta).expect("serialize"),
            serde_json::json!("MUY ALTA")
        );
    }

    #[test]
    fn filter_names_match_serde() {
        for filter in TodoFilter::ALL {
            assert_eq!(
                serde_json::to_value(filter).expect("serialize"),
                serde_json::json!(filter.as_str())
            );
        }
        assert_eq!(TodoFilter::Work.workspace(), Some(Workspace::Work));
        assert_eq!(TodoFilter::All.workspace(), None);
    }

    #[test]
    fn create_outcome_is_tagged() {
        let created = CreateOutcome::Created {
            page_id: "abc".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&created).expect("serialize"),
            serde_json::json!({"status": "created", "pageId": "abc"})
        );
        assert_eq!(
            serde_json::to_value(CreateOutcome::Failed {
                error: "Title is required".to_string()
            })
            .expect("serialize"),
            serde_json::json!({"status": "failed", "error": "Title is required"})
        );
    }
}
