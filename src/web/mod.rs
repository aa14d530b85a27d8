pub mod catalog;
pub mod contents;
pub mod courses;
pub mod error;
pub mod students;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Descending order. Order is important.
    // Route resolution will stop at the first match.
    catalog::configure(conf);
    students::configure(conf);
    courses::configure(conf);
    contents::configure(conf);
}
