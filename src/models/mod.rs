pub mod progress;
pub mod request;
pub mod scan_result;
