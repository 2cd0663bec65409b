use crate::dates;
use crate::models::{Todo, TodoDateGroup, TodoFilter, TodoGroup};
use chrono::NaiveDate;
use std::cmp::Ordering;

pub fn date_group(due_date: Option<&str>, today: NaiveDate) -> TodoDateGroup {
    let Some(diff) = due_date.and_then(|due| dates::day_difference(due, today)) else {
        return TodoDateGroup::NoDate;
    };
    match diff {
        d if d < 0 => TodoDateGroup::Past,
        0 => TodoDateGroup::Today,
        1 => TodoDateGroup::Tomorrow,
        2..=7 => TodoDateGroup::NextWeek,
        _ => TodoDateGroup::Later,
    }
}

/// Dated todos first, ascending by their ISO date string; undated todos keep their
/// incoming order at the end.
pub fn compare_due(a: &Todo, b: &Todo) -> Ordering {
    match (a.due_date.as_deref(), b.due_date.as_deref()) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn filter_open(todos: &[Todo], filter: TodoFilter) -> Vec<Todo> {
    todos
        .iter()
        .filter(|todo| !todo.done)
        .filter(|todo| filter.workspace().map_or(true, |ws| todo.workspace == ws))
        .cloned()
        .collect()
}

/// Open todos matching `filter`, sorted by due date and bucketed relative to `today`.
/// Buckets come out in [`TodoDateGroup::ORDER`]; empty ones are dropped.
pub fn project(todos: &[Todo], filter: TodoFilter, today: NaiveDate) -> Vec<TodoGroup> {
    let mut open = filter_open(todos, filter);
    open.sort_by(compare_due);

    let mut buckets: Vec<TodoGroup> = TodoDateGroup::ORDER
        .iter()
        .map(|group| TodoGroup {
            group: *group,
            todos: Vec::new(),
        })
        .collect();

    for todo in open {
        let group = date_group(todo.due_date.as_deref(), today);
        if let Some(bucket) = buckets.iter_mut().find(|bucket| bucket.group == group) {
            bucket.todos.push(todo);
        }
    }

    buckets.retain(|bucket| !bucket.todos.is_empty());
    buckets
}

/// Case-insensitive title substring match; a blank query keeps everything.
pub fn search(todos: Vec<Todo>, query: Option<&str>) -> Vec<Todo> {
    let Some(query) = query.map(str::trim).filter(|query| !query.is_empty()) else {
        return todos;
    };
    let needle = query.to_lowercase();
    todos
        .into_iter()
        .filter(|todo| todo.title.to_lowercase().contains(&needle))
        .collect()
}
