pub mod blog_entity;
pub mod category_entity;
pub mod college_entity;
pub mod country_entity;
pub mod enquiry_entity;
pub mod exam_entity;
pub mod mail_entity;
pub mod role_entity;

pub(crate) fn default_true() -> bool {
    true
}
