use std::collections::HashMap;

use actix_web::{HttpResponse, Responder, guard, web};
use tracing::warn;

use crate::{Data, command::process, identity::SlashRequest};

/// Routes for the slash-command endpoint and the health check.
pub fn routes(allowed_host: Option<String>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        let mut slash = web::resource("/v1");
        if let Some(host) = allowed_host {
            slash = slash.guard(guard::Host(host));
        }

        cfg.service(slash.route(web::post().to(slash_command)))
            .route("/healthz", web::get().to(healthz));
    }
}

async fn slash_command(
    data: web::Data<Data>,
    form: web::Form<HashMap<String, String>>,
) -> impl Responder {
    let request = match SlashRequest::from_fields(&form) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "rejected slash command");
            return HttpResponse::BadRequest().body(e.to_string());
        }
    };

    let reply = process(data.get_ref(), &request.text, &request.identity).await;
    HttpResponse::Ok().json(reply)
}

async fn healthz() -> impl Responder {
    "ok"
}
