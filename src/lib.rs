//! Course platform backend: catalog, course authoring, polymorphic module
//! content and student enrollment, served as a JSON API over actix-web.

pub mod app_config;
pub mod cache;
pub mod content;
pub mod courses;
pub mod db;
pub mod error;
pub mod middleware;
pub mod ordering;
pub mod orm;
pub mod storage;
pub mod students;
pub mod web;
