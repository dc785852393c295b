//! Server-rendered pages for the employees app.

use crate::model::employee::Employee;

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn home(version: &str) -> String {
    layout(
        "Employee Directory",
        &format!(
            r#"  <h1>Employee Directory</h1>
  <p>Version: <span id="version">{}</span></p>
  <ul>
    <li><a href="/employees">View Employees</a></li>
    <li><a href="/add_employee">Add Employee</a></li>
  </ul>"#,
            escape(version)
        ),
    )
}

pub fn employee_list(employees: &[Employee]) -> String {
    let rows: String = employees
        .iter()
        .map(|e| {
            format!(
                "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td></tr>\n",
                e.id,
                escape(&e.name),
                escape(&e.department),
                e.salary
            )
        })
        .collect();

    layout(
        "Employees",
        &format!(
            r#"  <h1>Employees</h1>
  <table>
    <tr><th>ID</th><th>Name</th><th>Department</th><th>Salary</th></tr>
{rows}  </table>
  <p><a href="/add_employee">Add Employee</a> | <a href="/">Home</a></p>"#
        ),
    )
}

pub fn add_employee_form() -> String {
    layout(
        "Add Employee",
        r#"  <h1>Add Employee</h1>
  <form method="post" action="/add_employee">
    <label>Name <input type="text" name="name" required></label>
    <label>Department <input type="text" name="department" required></label>
    <label>Salary <input type="number" step="0.01" name="salary" required></label>
    <button type="submit">Add</button>
  </form>
  <p><a href="/employees">View Employees</a></p>"#,
    )
}

pub fn employee_added() -> String {
    "Employee added successfully! <a href='/employees'>View Employees</a>".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_user_supplied_values() {
        let page = employee_list(&[Employee {
            id: 7,
            name: "<script>alert('x')</script>".into(),
            department: "R&D".into(),
            salary: 1200.5,
        }]);

        assert!(page.contains("&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;"));
        assert!(page.contains("R&amp;D"));
        assert!(page.contains("1200.50"));
        assert!(!page.contains("<script>"));
    }
}
