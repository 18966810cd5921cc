pub mod audit_logs;
pub mod blog_posts;
pub mod cart_items;
pub mod cart_promos;
pub mod purchase_items;
pub mod purchases;
pub mod revoked_tokens;
pub mod reviews;
pub mod templates;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use blog_posts::Entity as BlogPosts;
pub use cart_items::Entity as CartItems;
pub use cart_promos::Entity as CartPromos;
pub use purchase_items::Entity as PurchaseItems;
pub use purchases::Entity as Purchases;
pub use revoked_tokens::Entity as RevokedTokens;
pub use reviews::Entity as Reviews;
pub use templates::Entity as Templates;
pub use users::Entity as Users;
