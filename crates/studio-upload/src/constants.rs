//! Upload server constants

pub mod routes {
    pub const UPLOAD: &str = "/api/upload";
    pub const HEALTH: &str = "/api/health";
    /// Prefix stored files are served under
    pub const FILES: &str = "/uploads";
    /// Multipart field carrying the file
    pub const FILE_FIELD: &str = "file";
}

pub mod env {
    pub const PORT: &str = "PORT";
    pub const UPLOAD_DIR: &str = "UPLOAD_DIR";
}

pub mod defaults {
    pub const PORT: u16 = 5000;
    pub const HOST: &str = "0.0.0.0";
    pub const UPLOAD_DIR: &str = "uploads";
    /// Used when the client sends no content type
    pub const MIME_TYPE: &str = "application/octet-stream";
    pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;
}
