//! 基础设施层
//!
//! 持有外部资源（HTTP 连接池、外部进程、文件系统轮询），只暴露能力，
//! 不认识供应商和注册表。

pub mod download_watch;
pub mod http_client;
pub mod poppler;
pub mod tesseract;

pub use download_watch::DownloadWatch;
pub use http_client::HttpClient;
pub use poppler::{PageRasterizer, PopplerRasterizer};
pub use tesseract::{TesseractRecognizer, TextRecognizer};
