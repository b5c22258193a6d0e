pub struct Env {
    pub ip: String,
    pub port: u16,
    pub upload_dir: String,
    pub max_upload_size: usize,
    pub cors_origin: Option<String>,
    pub workers: usize,
}

pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

impl Env {
    fn new() -> Self {
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .map(|v| v.parse::<usize>().expect("MAX_UPLOAD_SIZE must be a valid byte count"))
            .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE);

        let cors_origin = std::env::var("CORS_ORIGIN").ok().filter(|v| !v.is_empty());
        let workers = std::env::var("WORKERS")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<usize>()
            .expect("WORKERS must be a valid usize integer");
        Env { ip, port, upload_dir, max_upload_size, cors_origin, workers }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
