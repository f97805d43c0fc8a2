pub mod cv;
pub mod letter;
pub mod profile;
pub mod request;
pub mod template;
pub mod version;
