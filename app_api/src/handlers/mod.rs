pub mod auth_handler;
pub mod blog_handler;
pub mod category_handler;
pub mod college_handler;
pub mod common_handler;
pub mod country_handler;
pub mod enquiry_handler;
pub mod exam_handler;
pub mod role_handler;
pub mod swagger;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    common_handler::configure(cfg);
    college_handler::configure(cfg);
    country_handler::configure(cfg);
    exam_handler::configure(cfg);
    category_handler::configure(cfg);
    blog_handler::configure(cfg);
    enquiry_handler::configure(cfg);
    role_handler::configure(cfg);
    auth_handler::configure(cfg);
    swagger::configure(cfg);
}
