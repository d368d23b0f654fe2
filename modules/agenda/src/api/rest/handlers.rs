use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path},
    http::{HeaderMap, StatusCode, Uri},
    Extension, Json,
};
use modkit::api::problem::ProblemResponse;
use tracing::{error, info};

use crate::api::rest::dto::{
    HobbyDto, HobbyReq, PersonDto, PersonReq, PersonWithHobbiesDto, ReunionDto, ReunionLinkDto,
    ReunionReq,
};
use crate::api::rest::error::{invalid_host, map_domain_error, not_found_pk};
use crate::api::rest::links::LinkBuilder;
use crate::domain::service::Service;

type ApiResult<T> = Result<T, ProblemResponse>;

fn parse_pk(pk: &str, uri: &Uri) -> ApiResult<i32> {
    pk.parse::<i32>().map_err(|_| not_found_pk(pk, uri.path()))
}

pub async fn list_persons(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> ApiResult<Json<Vec<PersonDto>>> {
    info!("Listing persons");

    match svc.list_persons().await {
        Ok(persons) => Ok(Json(persons.into_iter().map(PersonDto::from).collect())),
        Err(e) => {
            error!("Failed to list persons: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn search_persons(
    Extension(svc): Extension<Arc<Service>>,
    Path(kword): Path<String>,
    uri: Uri,
) -> ApiResult<Json<Vec<PersonDto>>> {
    info!("Searching persons by {:?}", kword);

    match svc.search_persons(&kword).await {
        Ok(persons) => Ok(Json(persons.into_iter().map(PersonDto::from).collect())),
        Err(e) => {
            error!("Failed to search persons: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn create_person(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    body: Result<Json<PersonReq>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PersonDto>)> {
    let Json(req) = body.map_err(|r| modkit::json_rejection(r, uri.path()))?;
    info!("Creating person");

    match svc.create_person(req.into()).await {
        Ok(person) => Ok((StatusCode::CREATED, Json(PersonDto::from(person)))),
        Err(e) => {
            error!("Failed to create person: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn get_person(
    Extension(svc): Extension<Arc<Service>>,
    Path(pk): Path<String>,
    uri: Uri,
) -> ApiResult<Json<PersonDto>> {
    info!("Getting person {}", pk);
    let id = parse_pk(&pk, &uri)?;

    match svc.get_person(id).await {
        Ok(person) => Ok(Json(PersonDto::from(person))),
        Err(e) => {
            error!("Failed to get person {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn delete_person(
    Extension(svc): Extension<Arc<Service>>,
    Path(pk): Path<String>,
    uri: Uri,
) -> ApiResult<StatusCode> {
    info!("Deleting person {}", pk);
    let id = parse_pk(&pk, &uri)?;

    match svc.delete_person(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete person {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

async fn update_person(
    svc: &Service,
    pk: &str,
    uri: &Uri,
    body: Result<Json<PersonReq>, JsonRejection>,
    partial: bool,
) -> ApiResult<Json<PersonDto>> {
    let id = parse_pk(pk, uri)?;
    let Json(req) = body.map_err(|r| modkit::json_rejection(r, uri.path()))?;
    info!("Updating person {} (partial: {})", id, partial);

    match svc.update_person(id, req.into(), partial).await {
        Ok(person) => Ok(Json(PersonDto::from(person))),
        Err(e) => {
            error!("Failed to update person {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn replace_person(
    Extension(svc): Extension<Arc<Service>>,
    Path(pk): Path<String>,
    uri: Uri,
    body: Result<Json<PersonReq>, JsonRejection>,
) -> ApiResult<Json<PersonDto>> {
    update_person(&svc, &pk, &uri, body, false).await
}

pub async fn patch_person(
    Extension(svc): Extension<Arc<Service>>,
    Path(pk): Path<String>,
    uri: Uri,
    body: Result<Json<PersonReq>, JsonRejection>,
) -> ApiResult<Json<PersonDto>> {
    update_person(&svc, &pk, &uri, body, true).await
}

pub async fn list_persons_with_hobbies(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> ApiResult<Json<Vec<PersonWithHobbiesDto>>> {
    info!("Listing persons with hobbies");

    match svc.list_persons_with_hobbies().await {
        Ok(persons) => Ok(Json(
            persons.into_iter().map(PersonWithHobbiesDto::from).collect(),
        )),
        Err(e) => {
            error!("Failed to list persons with hobbies: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn list_reuniones(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> ApiResult<Json<Vec<ReunionDto>>> {
    info!("Listing reuniones");

    match svc.list_reuniones().await {
        Ok(reuniones) => Ok(Json(reuniones.into_iter().map(ReunionDto::from).collect())),
        Err(e) => {
            error!("Failed to list reuniones: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn list_reuniones_link(
    Extension(svc): Extension<Arc<Service>>,
    Extension(links): Extension<Arc<LinkBuilder>>,
    headers: HeaderMap,
    uri: Uri,
) -> ApiResult<Json<Vec<ReunionLinkDto>>> {
    info!("Listing hyperlinked reuniones");
    let base = links
        .base(&headers, &uri)
        .map_err(|e| invalid_host(&e, uri.path()))?;

    match svc.list_reuniones().await {
        Ok(reuniones) => Ok(Json(
            reuniones
                .into_iter()
                .map(|r| {
                    let url = LinkBuilder::person_detail(&base, r.persona);
                    ReunionLinkDto::new(r, url)
                })
                .collect(),
        )),
        Err(e) => {
            error!("Failed to list reuniones: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn create_reunion(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    body: Result<Json<ReunionReq>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ReunionDto>)> {
    let Json(req) = body.map_err(|r| modkit::json_rejection(r, uri.path()))?;
    info!("Creating reunion");

    match svc.create_reunion(req.into()).await {
        Ok(reunion) => Ok((StatusCode::CREATED, Json(ReunionDto::from(reunion)))),
        Err(e) => {
            error!("Failed to create reunion: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn list_hobbies(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> ApiResult<Json<Vec<HobbyDto>>> {
    info!("Listing hobbies");

    match svc.list_hobbies().await {
        Ok(hobbies) => Ok(Json(hobbies.into_iter().map(HobbyDto::from).collect())),
        Err(e) => {
            error!("Failed to list hobbies: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn create_hobby(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    body: Result<Json<HobbyReq>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<HobbyDto>)> {
    let Json(req) = body.map_err(|r| modkit::json_rejection(r, uri.path()))?;
    info!("Creating hobby");

    match svc.create_hobby(req.into()).await {
        Ok(hobby) => Ok((StatusCode::CREATED, Json(HobbyDto::from(hobby)))),
        Err(e) => {
            error!("Failed to create hobby: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
