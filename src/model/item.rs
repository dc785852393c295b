use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "E2E Item",
        "description": "End-to-end test"
    })
)]
pub struct Item {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "E2E Item")]
    pub name: String,

    #[schema(example = "End-to-end test", nullable = true)]
    pub description: Option<String>,
}
