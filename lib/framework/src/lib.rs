pub mod http_client;
pub mod json;
pub mod task;
pub mod web;
