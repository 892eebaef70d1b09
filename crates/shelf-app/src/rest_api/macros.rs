/// Generates `crud_api` module with list, get, create, update and delete handlers.
///
/// Expects `<Entity>Repository`, `Create<Entity>` and `Update<Entity>` in scope,
/// second argument is the static [`ResourceDescriptor`](crate::rest_api::descriptor::ResourceDescriptor).
#[macro_export]
macro_rules! crud_api {
    ($entity:ident, $descriptor:path) => {
        type EntityRepository = paste::paste! {[<$entity Repository>]};
        $crate::repository_from_request!(EntityRepository);

        pub mod crud_api {
            use super::*;
            use axum::{
                extract::{OriginalUri, Path, RawQuery, State},
                response::Response,
            };
            use $crate::auth::token::Actor;
            use $crate::error::ApiResult;
            use $crate::policy::{self, Action};
            use $crate::rest_api::{paging::Pagination, query::parse_query, response};
            use $crate::state::AppState;
            use $crate::validate::Payload;

            type CreateEntity = paste::paste! {[<Create $entity>]};
            type UpdateEntity = paste::paste! {[<Update $entity>]};

            pub async fn list(
                repository: EntityRepository,
                actor: Actor,
                State(state): State<AppState>,
                OriginalUri(uri): OriginalUri,
                RawQuery(query): RawQuery,
            ) -> ApiResult<Response> {
                policy::require($descriptor.kind, Action::Index, &actor)?;
                let query = query.unwrap_or_default();
                let spec = parse_query(&query, &$descriptor, state.config().page_limits())?;
                let batch = repository.list(spec.to_listing_params()).await?;
                let link = Pagination::new(spec.page, spec.per, batch.total)
                    .link_header(&state.absolute_url(uri.path()), &query);
                response::list(&$descriptor, &spec, &batch.rows, link)
            }

            pub async fn get(
                Path(id): Path<i64>,
                repository: EntityRepository,
                actor: Actor,
            ) -> ApiResult<Response> {
                policy::require($descriptor.kind, Action::Show, &actor)?;
                let record = repository.get(id).await?;
                Ok(response::show(&$descriptor, &record))
            }

            pub async fn create(
                repository: EntityRepository,
                actor: Actor,
                State(state): State<AppState>,
                payload: Payload<CreateEntity>,
            ) -> ApiResult<Response> {
                policy::require($descriptor.kind, Action::Create, &actor)?;
                let payload = payload.validate()?;
                let record = repository.create(payload).await?;
                tracing::debug!("Created {} {}", $descriptor.name, record.id);
                let location = state.absolute_url(&$descriptor.record_path(&record));
                response::created(&$descriptor, &record, &location)
            }

            pub async fn update(
                Path(id): Path<i64>,
                repository: EntityRepository,
                actor: Actor,
                payload: Payload<UpdateEntity>,
            ) -> ApiResult<Response> {
                policy::require($descriptor.kind, Action::Update, &actor)?;
                let payload = payload.validate()?;
                let record = repository.update(id, payload).await?;
                Ok(response::show(&$descriptor, &record))
            }

            pub async fn delete(
                Path(id): Path<i64>,
                repository: EntityRepository,
                actor: Actor,
            ) -> ApiResult<Response> {
                policy::require($descriptor.kind, Action::Destroy, &actor)?;
                repository.delete(id).await?;
                tracing::debug!("Deleted {} {}", $descriptor.name, id);
                Ok(response::deleted())
            }
        }
    };
}

#[macro_export]
macro_rules! crud_router {
    () => {
        pub fn router() -> axum::Router<$crate::state::AppState> {
            use axum::routing::get;
            axum::Router::new()
                .route("/", get(crud_api::list).post(crud_api::create))
                .route(
                    "/{id}",
                    get(crud_api::get)
                        .patch(crud_api::update)
                        .put(crud_api::update)
                        .delete(crud_api::delete),
                )
        }
    };
}
