//! Smoke tests for the core catalog flows used by the frontend.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use catalogo::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

const DEFAULT_API_KEY: &str = "catalogo_default_api_key_please_regenerate";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();

    let state = catalogo::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");
    catalogo::api::router(state).await
}

async fn create_media(app: &Router, body: serde_json::Value) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/medias")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn smoke_media_crud_flow() {
    let app = spawn_app().await;

    let created = create_media(
        &app,
        serde_json::json!({
            "titulo": "Blade Runner",
            "tipo": "pelicula",
            "anio": 1982,
            "genero": "Ciencia ficción, Drama"
        }),
    )
    .await;

    let media_id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["titulo"], "Blade Runner");
    assert_eq!(created["data"]["pendiente"], false);

    // Adding the same title+year again only re-attaches, and the caller
    // already has it.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/medias")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "titulo": "Blade Runner",
                        "tipo": "pelicula",
                        "anio": 1982
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Rating outside 0-10 is rejected
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/medias/{media_id}"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "nota_personal": 11.0 }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/medias/{media_id}"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "nota_personal": 8.5,
                        "favorito": true,
                        "pendiente": false
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let patched: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(patched["data"]["nota_personal"], 8.5);
    assert_eq!(patched["data"]["favorito"], true);
    assert_eq!(patched["data"]["pendiente"], false);

    // Explicit null clears the rating
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/medias/{media_id}"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "nota_personal": null }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let cleared: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(cleared["data"]["nota_personal"].is_null());

    // Listing with include_total exposes X-Total-Count
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/medias?tipo=pelicula&include_total=true")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("X-Total-Count")
            .and_then(|v| v.to_str().ok()),
        Some("1")
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/medias/{media_id}"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/medias/{media_id}"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn smoke_listas_flow() {
    let app = spawn_app().await;

    let media = create_media(
        &app,
        serde_json::json!({
            "titulo": "Seven Samurai",
            "tipo": "pelicula",
            "anio": 1954
        }),
    )
    .await;
    let media_id = media["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/listas")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "nombre": "Cine japonés",
                        "descripcion": "Clásicos de Kurosawa y compañía"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let lista: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let lista_id = lista["data"]["id"].as_i64().unwrap();

    let add_body = serde_json::json!({ "media_id": media_id, "personal_position": 1 });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/listas/{lista_id}/medias"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header("Content-Type", "application/json")
                .body(Body::from(add_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same media twice is a conflict
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/listas/{lista_id}/medias"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header("Content-Type", "application/json")
                .body(Body::from(add_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Reorder must name exactly the current items
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/listas/{lista_id}/reorder"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "media_ids": [9999] }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/listas/{lista_id}/reorder"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "media_ids": [media_id] }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/listas/{lista_id}"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let detail: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let items = detail["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["media_id"], media_id);
    assert!(items[0]["personal_position"].is_number());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/listas/{lista_id}/medias/{media_id}"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/listas/{lista_id}"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn smoke_stats_flow() {
    let app = spawn_app().await;

    create_media(
        &app,
        serde_json::json!({
            "titulo": "La gran belleza",
            "tipo": "pelicula",
            "anio": 2013,
            "genero": "Drama",
            "nota_personal": 9.0
        }),
    )
    .await;

    create_media(
        &app,
        serde_json::json!({
            "titulo": "Película pendiente",
            "tipo": "pelicula",
            "anio": 2020,
            "genero": "Drama",
            "pendiente": true
        }),
    )
    .await;

    // Unfiltered count covers the whole catalog, pending rows included
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/medias/stats/count")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let count: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(count["data"]["total"], 2);

    // The pendiente filter narrows it to watched rows only
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/medias/stats/count?pendiente=false")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let count: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(count["data"]["total"], 1);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/medias/stats/top5?tipo=pelicula")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let top5: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let entries = top5["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["titulo"], "La gran belleza");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/medias/stats/distribucion-generos")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let generos: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(generos["data"]["Drama"], 1);
}
