use std::sync::Arc;

use axum::{Extension, Router};
use modkit::api::{Missing, OpenApiRegistry, OperationBuilder};

use crate::api::rest::links::LinkBuilder;
use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

/// Person endpoints, plus the update ones that the `modificar` alias repeats.
fn person_routes(mut router: Router, openapi: &dyn OpenApiRegistry) -> Router {
    router = OperationBuilder::<Missing, Missing, ()>::get("/api/persona/list")
        .operation_id("agenda.list_persons")
        .summary("List persons")
        .tag("persona")
        .handler(handlers::list_persons)
        .json_list_response::<dto::PersonDto>(openapi, 200, "All persons ordered by id")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/persona/search/{kword}")
        .operation_id("agenda.search_persons")
        .summary("Search persons by name")
        .description("Case-insensitive substring match on full_name.")
        .tag("persona")
        .path_param("kword", "Substring to look for")
        .handler(handlers::search_persons)
        .json_list_response::<dto::PersonDto>(openapi, 200, "Matching persons")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/persona/create")
        .operation_id("agenda.create_person")
        .summary("Create person")
        .tag("persona")
        .json_request::<dto::PersonReq>(openapi, "Person fields")
        .handler(handlers::create_person)
        .json_response_with_schema::<dto::PersonDto>(openapi, 201, "Created person")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/persona/detail/{pk}")
        .operation_id("agenda.get_person")
        .summary("Get person by id")
        .tag("persona")
        .path_param("pk", "Person id")
        .handler(handlers::get_person)
        .json_response_with_schema::<dto::PersonDto>(openapi, 200, "Person found")
        .problem_response(openapi, 404, "Not Found")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::delete("/api/persona/delete/{pk}")
        .operation_id("agenda.delete_person")
        .summary("Delete person")
        .description("Also deletes the person's reuniones and hobby links.")
        .tag("persona")
        .path_param("pk", "Person id")
        .handler(handlers::delete_person)
        .empty_response(204, "Deleted")
        .problem_response(openapi, 404, "Not Found")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    for (path, prefix) in [
        ("/api/persona/update/{pk}", "agenda.update_person"),
        ("/api/persona/modificar/{pk}", "agenda.modificar_person"),
    ] {
        router = OperationBuilder::<Missing, Missing, ()>::put(path)
            .operation_id(format!("{prefix}.put"))
            .summary("Replace person")
            .description("Every field except hobbies is required; omitted hobbies are kept.")
            .tag("persona")
            .path_param("pk", "Person id")
            .json_request::<dto::PersonReq>(openapi, "Person fields")
            .handler(handlers::replace_person)
            .json_response_with_schema::<dto::PersonDto>(openapi, 200, "Updated person")
            .problem_response(openapi, 400, "Bad Request")
            .problem_response(openapi, 404, "Not Found")
            .register(router, openapi);

        router = OperationBuilder::<Missing, Missing, ()>::patch(path)
            .operation_id(format!("{prefix}.patch"))
            .summary("Partially update person")
            .description("Only supplied fields are validated and applied.")
            .tag("persona")
            .path_param("pk", "Person id")
            .json_request::<dto::PersonReq>(openapi, "Subset of person fields")
            .handler(handlers::patch_person)
            .json_response_with_schema::<dto::PersonDto>(openapi, 200, "Updated person")
            .problem_response(openapi, 400, "Bad Request")
            .problem_response(openapi, 404, "Not Found")
            .register(router, openapi);
    }

    OperationBuilder::<Missing, Missing, ()>::get("/api/persona/modificar/{pk}")
        .operation_id("agenda.modificar_person.get")
        .summary("Get person by id")
        .tag("persona")
        .path_param("pk", "Person id")
        .handler(handlers::get_person)
        .json_response_with_schema::<dto::PersonDto>(openapi, 200, "Person found")
        .problem_response(openapi, 404, "Not Found")
        .register(router, openapi)
}

pub fn register_routes(
    mut router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
    links: Arc<LinkBuilder>,
) -> anyhow::Result<Router> {
    router = person_routes(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/personas/")
        .operation_id("agenda.list_persons_with_hobbies")
        .summary("List persons with their hobbies")
        .tag("persona")
        .handler(handlers::list_persons_with_hobbies)
        .json_list_response::<dto::PersonWithHobbiesDto>(openapi, 200, "Persons with hobbies")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/reuniones/")
        .operation_id("agenda.list_reuniones")
        .summary("List reuniones")
        .tag("reunion")
        .handler(handlers::list_reuniones)
        .json_list_response::<dto::ReunionDto>(openapi, 200, "All reuniones ordered by id")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/reuniones-link/")
        .operation_id("agenda.list_reuniones_link")
        .summary("List reuniones with person links")
        .tag("reunion")
        .handler(handlers::list_reuniones_link)
        .json_list_response::<dto::ReunionLinkDto>(openapi, 200, "All reuniones ordered by id")
        .problem_response(openapi, 400, "Host not allowed")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/reunion/create")
        .operation_id("agenda.create_reunion")
        .summary("Create reunion")
        .tag("reunion")
        .json_request::<dto::ReunionReq>(openapi, "Reunion fields")
        .handler(handlers::create_reunion)
        .json_response_with_schema::<dto::ReunionDto>(openapi, 201, "Created reunion")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/hobbies/")
        .operation_id("agenda.list_hobbies")
        .summary("List hobbies")
        .tag("hobby")
        .handler(handlers::list_hobbies)
        .json_list_response::<dto::HobbyDto>(openapi, 200, "All hobbies ordered by id")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/hobbies/")
        .operation_id("agenda.create_hobby")
        .summary("Create hobby")
        .tag("hobby")
        .json_request::<dto::HobbyReq>(openapi, "Hobby name")
        .handler(handlers::create_hobby)
        .json_response_with_schema::<dto::HobbyDto>(openapi, 201, "Created hobby")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    Ok(router.layer(Extension(service)).layer(Extension(links)))
}
