use crate::{
    config::Config,
    db::{self, Database},
    error::AppError,
    model::employee::Employee,
    views,
};
use actix_web::{HttpResponse, http::header::ContentType, web};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Raw form fields. Everything arrives as text and is validated in `validate`.
#[derive(Debug, Deserialize)]
pub struct EmployeeForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub salary: String,
}

#[derive(Debug, PartialEq)]
struct NewEmployee {
    name: String,
    department: String,
    salary: f64,
}

impl EmployeeForm {
    fn validate(self) -> Result<NewEmployee, AppError> {
        for (field, value) in [
            ("name", &self.name),
            ("department", &self.department),
            ("salary", &self.salary),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{field} is required")));
            }
        }

        let salary = self
            .salary
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|s| s.is_finite())
            .ok_or_else(|| AppError::Validation("salary must be a number".into()))?;

        Ok(NewEmployee {
            name: self.name,
            department: self.department,
            salary,
        })
    }
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

pub async fn home(config: web::Data<Config>) -> HttpResponse {
    html(views::home(&config.app_version()))
}

pub async fn list_employees(db: web::Data<Database>) -> Result<HttpResponse, AppError> {
    let mut conn = db.acquire().await?;
    let result = sqlx::query_as::<_, Employee>(
        "SELECT id, name, department, salary FROM employees ORDER BY id",
    )
    .fetch_all(&mut *conn)
    .await;
    conn.release().await;

    let employees = result?;
    debug!(count = employees.len(), "Fetched employees");
    Ok(html(views::employee_list(&employees)))
}

pub async fn add_employee_form() -> HttpResponse {
    html(views::add_employee_form())
}

#[instrument(name = "add_employee", skip(db, form))]
pub async fn add_employee(
    db: web::Data<Database>,
    form: web::Form<EmployeeForm>,
) -> Result<HttpResponse, AppError> {
    let employee = form.into_inner().validate()?;

    let mut conn = db.acquire().await?;
    let result = insert_employee(&mut conn, &employee).await;
    conn.release().await;

    let employee_id = result?;
    info!(employee_id, "Employee added");
    Ok(html(views::employee_added()))
}

async fn insert_employee(
    conn: &mut sqlx::AnyConnection,
    employee: &NewEmployee,
) -> Result<i64, AppError> {
    sqlx::query("INSERT INTO employees (name, department, salary) VALUES (?, ?, ?)")
        .bind(&employee.name)
        .bind(&employee.department)
        .bind(employee.salary)
        .execute(&mut *conn)
        .await?;

    db::last_insert_id(conn).await
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes;
    use crate::test_support::{TestDb, config_with};
    use actix_web::{App, http::StatusCode, test};

    #[actix_web::test]
    async fn home_renders_version() {
        for (release, version) in [("true", "9.0.0"), ("false", "0.0.1-dev")] {
            let config = config_with(&[("RELEASE_BUILD", release)]);
            let app = test::init_service(
                App::new()
                    .app_data(web::Data::new(config))
                    .configure(|cfg| routes::configure(cfg, &routes::route_table(false))),
            )
            .await;

            let req = test::TestRequest::get().uri("/").to_request();
            let body = test::call_and_read_body(&app, req).await;
            let body = String::from_utf8(body.to_vec()).unwrap();

            assert!(body.contains(&format!(r#"<span id="version">{version}</span>"#)));
        }
    }

    #[actix_web::test]
    async fn submitted_employee_appears_in_listing() {
        let test_db = TestDb::new().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_db.db.clone()))
                .configure(|cfg| routes::configure(cfg, &routes::route_table(false))),
        )
        .await;

        let req = test::TestRequest::get().uri("/add_employee").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/add_employee")
            .set_form([("name", "Grace"), ("department", "Engineering"), ("salary", "9100")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("Employee added successfully!"));

        let req = test::TestRequest::get().uri("/employees").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("<td>Grace</td><td>Engineering</td><td>9100.00</td>"));
    }

    #[actix_web::test]
    async fn bad_form_is_rejected_without_insert() {
        let test_db = TestDb::new().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_db.db.clone()))
                .configure(|cfg| routes::configure(cfg, &routes::route_table(false))),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/add_employee")
            .set_form([("name", "Grace"), ("department", "Engineering")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/employees").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert!(!String::from_utf8_lossy(&body).contains("Grace"));
    }
}
