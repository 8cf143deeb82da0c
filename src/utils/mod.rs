pub mod content_type;
pub mod curl_parser;
pub mod file_size;
pub mod folder;
