pub mod api_errors;
pub mod callback;
pub mod http;
pub mod paypack_client;
