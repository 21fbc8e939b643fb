use std::fmt::Write;

use crate::core::Todo;

/// Renders the three pages of the app from their data bags.
pub trait Views: Send + Sync {
    fn index(&self, todos: &[Todo], query: Option<&str>) -> String;
    fn new_form(&self) -> String;
    /// `None` when the requested todo could not be loaded.
    fn edit(&self, todo: Option<&Todo>) -> String;
}

#[derive(Debug, Clone, Default)]
pub struct HtmlViews;

impl Views for HtmlViews {
    fn index(&self, todos: &[Todo], query: Option<&str>) -> String {
        let mut body = String::new();
        body.push_str("<h1>Todos</h1>\n");
        let _ = write!(
            body,
            "<form method=\"GET\" action=\"/todos\">\
             <input type=\"search\" name=\"query\" value=\"{}\" placeholder=\"Search\">\
             <button type=\"submit\">Search</button></form>\n",
            escape(query.unwrap_or_default())
        );
        body.push_str("<p><a href=\"/todos/new\">New todo</a></p>\n");
        if todos.is_empty() {
            body.push_str("<p>Nothing to do.</p>\n");
        } else {
            body.push_str("<ul>\n");
            for todo in todos {
                let _ = write!(
                    body,
                    "<li{class}><span>{description}</span> <em>priority {priority}</em> \
                     <a href=\"/todos/{id}/edit\">Edit</a> \
                     <form method=\"POST\" action=\"/todos/{id}?_method=DELETE\" style=\"display:inline\">\
                     <button type=\"submit\">Delete</button></form></li>\n",
                    class = if todo.completed { " class=\"completed\"" } else { "" },
                    description = escape(&todo.description),
                    priority = todo.priority,
                    id = todo.id,
                );
            }
            body.push_str("</ul>\n");
        }
        page("Todos", &body)
    }

    fn new_form(&self) -> String {
        let body = format!(
            "<h1>New todo</h1>\n{}",
            todo_form("/todos", "", "", "Create")
        );
        page("New todo", &body)
    }

    fn edit(&self, todo: Option<&Todo>) -> String {
        let body = match todo {
            Some(todo) => format!(
                "<h1>Edit todo</h1>\n{}",
                todo_form(
                    &format!("/todos/{}?_method=PUT", todo.id),
                    &todo.description,
                    &todo.priority.to_string(),
                    "Save",
                )
            ),
            None => "<h1>Edit todo</h1>\n<p>That todo could not be found.</p>\n".to_string(),
        };
        page("Edit todo", &format!("{body}<p><a href=\"/todos\">Back to list</a></p>\n"))
    }
}

fn todo_form(action: &str, description: &str, priority: &str, submit: &str) -> String {
    format!(
        "<form method=\"POST\" action=\"{action}\">\
         <label>Description <input type=\"text\" name=\"description\" value=\"{description}\"></label>\
         <label>Priority <input type=\"number\" name=\"priority\" value=\"{priority}\"></label>\
         <button type=\"submit\">{submit}</button></form>\n",
        action = escape(action),
        description = escape(description),
        priority = escape(priority),
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{body}</body>\n</html>\n",
        escape(title)
    )
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
