//! Upload infrastructure module

mod service;

pub use service::UploadServiceClient;
