pub mod contents;
pub mod courses;
pub mod enrollments;
pub mod files;
pub mod images;
pub mod modules;
pub mod subjects;
pub mod texts;
pub mod users;
pub mod videos;
