//! Storage module for attachment blobs
//!
//! Provides a MinIO/S3-compatible client scoped to what chat needs:
//! presigned download URLs and deleting blobs when a thread is removed.
//! Uploads are owned by the media service.

mod minio_client;

pub use minio_client::MinIOClient;
