pub mod admin_service;
pub mod auth_service;
pub mod blog_service;
pub mod cart_service;
pub mod purchase_service;
pub mod review_service;
pub mod template_service;
