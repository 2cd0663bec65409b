use crate::backend::properties::PropertyReader;
use crate::backend::PageRecord;
use crate::models::{Priority, Todo, Workspace};
use crate::schema::FieldSchema;

pub const UNTITLED: &str = "Untitled";

/// Maps a database page to a [`Todo`]. Missing or mistyped properties fall back to
/// defaults; this never fails.
pub fn map_record_to_todo(record: &PageRecord, schema: &FieldSchema, workspace: Workspace) -> Todo {
    let reader = PropertyReader::new(&record.properties);
    let notes = reader.rich_text(schema.notes);

    Todo {
        id: record.id.clone(),
        title: reader
            .title(schema.title)
            .unwrap_or_else(|| UNTITLED.to_string()),
        description: notes.clone(),
        done: reader.checkbox(schema.done),
        due_date: reader.date_start(schema.date),
        priority: reader.select_name(schema.priority).and_then(Priority::from_label),
        notes,
        workspace,
        url: record.url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{PERSONAL_FIELDS, WORK_FIELDS};
    use serde_json::{json, Value};

    fn record(properties: Value) -> PageRecord {
        PageRecord {
            id: "page-1".to_string(),
            url: "https://www.notion.so/page-1".to_string(),
            properties: properties.as_object().cloned().expect("object"),
        }
    }

    #[test]
    fn maps_work_record_with_fragmented_title() {
        let page = record(json!({
            "Name": { "type": "title", "title": [{ "plain_text": "Buy" }, { "plain_text": " milk" }] },
            "Status": { "type": "checkbox", "checkbox": true }
        }));

        let todo = map_record_to_todo(&page, &WORK_FIELDS, Workspace::Work);
        assert_eq!(todo.title, "Buy milk");
        assert!(todo.done);
        assert_eq!(todo.due_date, None);
        assert_eq!(todo.priority, None);
        assert_eq!(todo.workspace, Workspace::Work);
        assert_eq!(todo.id, "page-1");
        assert_eq!(todo.url, "https://www.notion.so/page-1");
    }

    #[test]
    fn empty_record_gets_safe_defaults() {
        let todo = map_record_to_todo(&record(json!({})), &PERSONAL_FIELDS, Workspace::Personal);
        assert_eq!(todo.title, UNTITLED);
        assert!(!todo.done);
        assert_eq!(todo.notes, None);
        assert_eq!(todo.description, None);
        assert_eq!(todo.due_date, None);
    }

    #[test]
    fn blank_title_falls_back_to_untitled() {
        let page = record(json!({
            "Tarea": { "title": [] },
            "Notas": { "rich_text": [] }
        }));
        let todo = map_record_to_todo(&page, &PERSONAL_FIELDS, Workspace::Personal);
        assert_eq!(todo.title, UNTITLED);
        assert_eq!(todo.notes.as_deref(), Some(""));
    }

    #[test]
    fn reads_fields_through_the_workspace_schema() {
        let page = record(json!({
            "Tarea": { "title": [{ "plain_text": "Pagar luz" }] },
            "Realizado": { "checkbox": false },
            "Fecha": { "date": { "start": "2025-03-10" } },
            "Prioridad": { "select": { "name": "Alta" } },
            "Notas": { "rich_text": [{ "plain_text": "antes del " }, { "plain_text": "viernes" }] },
            "Name": { "title": [{ "plain_text": "ignored" }] }
        }));

        let todo = map_record_to_todo(&page, &PERSONAL_FIELDS, Workspace::Personal);
        assert_eq!(todo.title, "Pagar luz");
        assert_eq!(todo.due_date.as_deref(), Some("2025-03-10"));
        assert_eq!(todo.priority, Some(Priority::Alta));
        assert_eq!(todo.notes.as_deref(), Some("antes del viernes"));
        assert_eq!(todo.description, todo.notes);
    }

    #[test]
    fn priority_passes_only_known_labels() {
        for priority in Priority::ALL {
            let page = record(json!({ "Priority": { "select": { "name": priority.as_str() } } }));
            let todo = map_record_to_todo(&page, &WORK_FIELDS, Workspace::Work);
            assert_eq!(todo.priority, Some(priority));
        }

        for label in ["alta", "HIGH", "", "MUY  ALTA", "Media "] {
            let page = record(json!({ "Priority": { "select": { "name": label } } }));
            let todo = map_record_to_todo(&page, &WORK_FIELDS, Workspace::Work);
            assert_eq!(todo.priority, None, "label {label:?}");
        }

        let page = record(json!({ "Priority": { "select": null } }));
        assert_eq!(map_record_to_todo(&page, &WORK_FIELDS, Workspace::Work).priority, None);
    }

    #[test]
    fn date_is_passed_through_verbatim() {
        let page = record(json!({ "Due": { "date": { "start": "2025-03-10T09:00:00.000+02:00" } } }));
        let todo = map_record_to_todo(&page, &WORK_FIELDS, Workspace::Work);
        assert_eq!(todo.due_date.as_deref(), Some("2025-03-10T09:00:00.000+02:00"));
    }
}
