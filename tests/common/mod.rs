#![allow(dead_code)]

use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, delete, get, post, put, web};
use serde_json::json;

#[get("/greeting")]
async fn greeting() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("hello world")
}

#[get("/accept")]
async fn accept(req: HttpRequest) -> HttpResponse {
    let accept = req
        .headers()
        .get("accept")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    HttpResponse::Ok().content_type("text/plain").body(accept)
}

#[get("/engine")]
async fn engine() -> HttpResponse {
    HttpResponse::Ok().json(json!({"name": "decode-0", "load": 3}))
}

#[post("/echo")]
async fn echo(body: web::Json<serde_json::Value>) -> HttpResponse {
    HttpResponse::Ok().json(body.into_inner())
}

#[get("/status/{code}")]
async fn status(path: web::Path<u16>) -> HttpResponse {
    let code = StatusCode::from_u16(path.into_inner()).unwrap_or(StatusCode::IM_A_TEAPOT);
    HttpResponse::build(code).content_type("text/plain").body("status")
}

#[get("/slow")]
async fn slow() -> HttpResponse {
    actix_web::rt::time::sleep(Duration::from_secs(2)).await;
    HttpResponse::Ok().body("late")
}

#[put("/items/{id}")]
async fn put_item(_body: web::Json<serde_json::Value>) -> HttpResponse {
    HttpResponse::Ok().finish()
}

#[delete("/items/{id}")]
async fn delete_item() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Real HTTP server on an ephemeral local port
pub struct TestServer {
    pub base_url: String,
    handle: ServerHandle,
}

impl TestServer {
    pub async fn start() -> Self {
        let server = HttpServer::new(|| {
            App::new()
                .service(greeting)
                .service(accept)
                .service(engine)
                .service(echo)
                .service(status)
                .service(slow)
                .service(put_item)
                .service(delete_item)
        })
        .workers(1)
        .disable_signals()
        .shutdown_timeout(1)
        .bind(("127.0.0.1", 0))
        .expect("bind test server");
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        TestServer {
            base_url: format!("http://{}", addr),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}
