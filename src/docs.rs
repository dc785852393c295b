use crate::api::item::{CreateItem, MessageResponse};
use crate::model::item::Item;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Records API",
        version = "1.0.0",
        description = r#"
## Items API

Create, read, list and delete items stored in a single relational table.

- Every request opens its own database connection and releases it before responding.
- Deleting an id that does not exist still returns `200`.
- Errors are returned as `{"message": "..."}`.

The employees pages (`/`, `/employees`, `/add_employee`) are HTML and not described here.
"#,
    ),
    paths(
        crate::api::item::create_item,
        crate::api::item::list_items,
        crate::api::item::get_item,
        crate::api::item::delete_item
    ),
    components(
        schemas(
            Item,
            CreateItem,
            MessageResponse
        )
    ),
    tags(
        (name = "Items", description = "Item management APIs"),
    )
)]
pub struct ApiDoc;
