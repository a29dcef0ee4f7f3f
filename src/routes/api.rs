use crate::handlers;
use actix_web::{web, Scope};

pub fn config() -> Scope {
    web::scope("/resources").route("/courses", web::get().to(handlers::search_courses))
}
