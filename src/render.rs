//! HTML rendering for pages and list-item fragments.
//!
//! Fragments are sized for in-place insertion or replacement: each task
//! renders as an `<li>` whose DOM id is derived from the task id, and the
//! submission form always carries the `todo_form` id so a validation failure
//! can replace it wholesale. The full pages embed a small script that applies
//! pushed instructions from the `/todos/stream` WebSocket.

use crate::types::{FieldError, Task, TaskId};

/// DOM id of the task list container.
pub const LIST_TARGET: &str = "todos";

/// DOM id of the submission form.
pub const FORM_TARGET: &str = "todo_form";

/// DOM id of a single task's list item.
#[must_use]
pub fn item_target(id: TaskId) -> String {
    format!("todo_{id}")
}

/// Escapes text for safe interpolation into HTML.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders one task as a list-item fragment.
#[must_use]
pub fn task_item(task: &Task) -> String {
    let checked = if task.completed { " checked" } else { "" };
    let class = if task.completed { "task completed" } else { "task" };
    let description = task
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(|d| format!("<p class=\"description\">{}</p>", escape(d)))
        .unwrap_or_default();

    format!(
        "<li id=\"{target}\" class=\"{class}\">\
         <input type=\"checkbox\" data-task-id=\"{id}\"{checked}>\
         <a href=\"/todos/{id}\">{title}</a>{description}\
         <a href=\"/todos/{id}/edit\">Edit</a>\
         <button type=\"button\" data-delete-id=\"{id}\">Delete</button>\
         </li>",
        target = item_target(task.id),
        id = task.id,
        title = escape(&task.title),
    )
}

/// Renders the submission form fragment.
///
/// `task` prefills the fields for editing; `errors` are rendered inline above
/// the fields after a rejected submission.
#[must_use]
pub fn task_form(action: &str, method: &str, task: Option<&Task>, errors: &[FieldError]) -> String {
    let title = task.map(|t| escape(&t.title)).unwrap_or_default();
    let description = task
        .and_then(|t| t.description.as_deref())
        .map(escape)
        .unwrap_or_default();
    let checked = if task.is_some_and(|t| t.completed) {
        " checked"
    } else {
        ""
    };

    let error_list = if errors.is_empty() {
        String::new()
    } else {
        let items: String = errors
            .iter()
            .map(|e| format!("<li>{}</li>", escape(&e.to_string())))
            .collect();
        format!("<ul class=\"errors\">{items}</ul>")
    };

    format!(
        "<form id=\"{FORM_TARGET}\" data-action=\"{action}\" data-method=\"{method}\">\
         {error_list}\
         <label>Title <input type=\"text\" name=\"title\" value=\"{title}\"></label>\
         <label>Description <input type=\"text\" name=\"description\" value=\"{description}\"></label>\
         <label>Completed <input type=\"checkbox\" name=\"completed\" value=\"true\"{checked}></label>\
         <button type=\"submit\">Save</button>\
         </form>",
        action = escape(action),
        method = escape(method),
    )
}

/// Renders the list page: current tasks, newest first, plus an inline form.
#[must_use]
pub fn list_page(tasks: &[Task]) -> String {
    let items: String = tasks.iter().map(task_item).collect();
    let form = task_form("/todos", "POST", None, &[]);
    layout(
        "Todos",
        &format!("<h1>Todos</h1>{form}<ul id=\"{LIST_TARGET}\">{items}</ul>"),
    )
}

/// Renders the single-task page.
#[must_use]
pub fn task_page(task: &Task) -> String {
    let body = format!(
        "<h1>{title}</h1><ul id=\"{LIST_TARGET}\">{item}</ul><a href=\"/todos\">Back</a>",
        title = escape(&task.title),
        item = task_item(task),
    );
    layout(&task.title, &body)
}

/// Renders a blank or prefilled form page.
#[must_use]
pub fn form_page(heading: &str, action: &str, method: &str, task: Option<&Task>) -> String {
    let form = task_form(action, method, task, &[]);
    layout(
        heading,
        &format!("<h1>{}</h1>{form}<a href=\"/todos\">Back</a>", escape(heading)),
    )
}

/// Renders a generic error page.
#[must_use]
pub fn error_page(status: u16, message: &str) -> String {
    layout(
        &format!("{status}"),
        &format!("<h1>{status}</h1><p>{}</p>", escape(message)),
    )
}

/// Wraps a body in the shared page shell.
///
/// The embedded script keeps every open session in sync: it subscribes to the
/// `/todos/stream` WebSocket and applies prepend/replace/remove instructions,
/// and it submits forms, checkbox toggles, and deletes over `fetch` so the
/// response (and the broadcast) is a fragment instruction rather than a page.
fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\
         <html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body>{body}\
         <script>{SCRIPT}</script>\
         </body></html>",
        title = escape(title),
    )
}

const SCRIPT: &str = r##"
(function () {
  function apply(update) {
    var target = document.getElementById(update.target);
    if (update.action === "prepend") {
      if (target) target.insertAdjacentHTML("afterbegin", update.html);
    } else if (update.action === "replace") {
      if (target) target.outerHTML = update.html;
    } else if (update.action === "remove") {
      if (target) target.remove();
    }
  }

  var proto = location.protocol === "https:" ? "wss:" : "ws:";
  var ws = new WebSocket(proto + "//" + location.host + "/todos/stream");
  ws.onmessage = function (event) { apply(JSON.parse(event.data)); };

  function send(action, method, body) {
    return fetch(action, {
      method: method,
      headers: { "Content-Type": "application/x-www-form-urlencoded" },
      body: body
    });
  }

  document.addEventListener("submit", function (event) {
    var form = event.target.closest("#todo_form");
    if (!form) return;
    event.preventDefault();
    var data = new URLSearchParams(new FormData(form));
    // An unchecked checkbox is absent from FormData and absent means "leave
    // unchanged" on update, so always send an explicit value.
    var completed = form.querySelector('input[name="completed"]');
    if (completed) data.set("completed", completed.checked);
    send(form.dataset.action, form.dataset.method, data).then(function (res) {
      if (res.status === 422) {
        res.json().then(apply);
      } else if (form.dataset.method === "POST") {
        form.reset();
      }
    });
  });

  document.addEventListener("change", function (event) {
    var box = event.target;
    if (!box.dataset || !box.dataset.taskId) return;
    send("/todos/" + box.dataset.taskId, "PATCH", "completed=" + box.checked);
  });

  document.addEventListener("click", function (event) {
    var button = event.target;
    if (!button.dataset || !button.dataset.deleteId) return;
    send("/todos/" + button.dataset.deleteId, "DELETE", "");
  });
})();
"##;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_task(title: &str) -> Task {
        Task::new(TaskId::new(), title.to_string(), None, false, Utc::now())
    }

    #[test]
    fn escape_covers_html_metacharacters() {
        assert_eq!(
            escape("<b>\"milk\" & 'eggs'</b>"),
            "&lt;b&gt;&quot;milk&quot; &amp; &#39;eggs&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn task_item_carries_dom_id_and_title() {
        let task = sample_task("Buy milk");
        let html = task_item(&task);

        assert!(html.contains(&format!("id=\"todo_{}\"", task.id)));
        assert!(html.contains("Buy milk"));
        assert!(!html.contains("checked"));
    }

    #[test]
    fn task_item_escapes_title() {
        let task = sample_task("<script>alert(1)</script>");
        let html = task_item(&task);
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn form_renders_inline_errors() {
        let errors = vec![FieldError::new("title", "can't be blank")];
        let html = task_form("/todos", "POST", None, &errors);

        assert!(html.contains("id=\"todo_form\""));
        assert!(html.contains("title can&#39;t be blank"));
    }

    #[test]
    fn submit_script_sends_explicit_completed_value() {
        // An unchecked box would otherwise be dropped from the body and the
        // update would keep the task completed.
        let html = list_page(&[]);
        assert!(html.contains(r#"data.set("completed", completed.checked)"#));
    }

    #[test]
    fn list_page_orders_items_as_given() {
        let first = sample_task("First");
        let second = sample_task("Second");
        let html = list_page(&[second.clone(), first.clone()]);

        let second_pos = html.find("Second").unwrap();
        let first_pos = html.find("First").unwrap();
        assert!(second_pos < first_pos);
        assert!(html.contains("id=\"todos\""));
    }
}
