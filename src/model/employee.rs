#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub salary: f64,
}
