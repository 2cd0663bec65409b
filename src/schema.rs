use crate::models::Workspace;

/// Backend property names for each domain concept of a todo database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    pub title: &'static str,
    pub done: &'static str,
    pub date: &'static str,
    pub priority: &'static str,
    pub notes: &'static str,
}

pub const PERSONAL_FIELDS: FieldSchema = FieldSchema {
    title: "Tarea",
    done: "Realizado",
    date: "Fecha",
    priority: "Prioridad",
    notes: "Notas",
};

pub const WORK_FIELDS: FieldSchema = FieldSchema {
    title: "Name",
    done: "Status",
    date: "Due",
    priority: "Priority",
    notes: "Notes",
};

impl FieldSchema {
    pub fn for_workspace(workspace: Workspace) -> &'static FieldSchema {
        match workspace {
            Workspace::Personal => &PERSONAL_FIELDS,
            Workspace::Work => &WORK_FIELDS,
        }
    }
}
