use std::path::PathBuf;
use std::time::Duration;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 文档输出目录，所有组件都显式使用它，不依赖进程工作目录
    pub output_dir: PathBuf,
    /// 供应商注册表文件（TOML），为空时使用内置注册表
    pub registry_file: Option<PathBuf>,
    /// 等待页面元素出现的超时
    pub locator_timeout: Duration,
    /// 等待下载完成的最长时间
    pub download_timeout: Duration,
    /// 文件大小保持不变多久才视为下载完成
    pub download_settle: Duration,
    /// HTTP 请求超时
    pub http_timeout: Duration,
    /// HTTP User-Agent
    pub user_agent: String,
    /// Chrome 可执行文件路径，为空时自动查找
    pub chrome_executable: Option<PathBuf>,
    /// 是否使用无头模式
    pub headless: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- OCR 配置 ---
    pub ocr_dpi: u32,
    pub ocr_lang: String,
    /// 中间图片的存放目录
    pub ocr_artifact_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("pricelists"),
            registry_file: None,
            locator_timeout: Duration::from_secs(10),
            download_timeout: Duration::from_secs(60),
            download_settle: Duration::from_millis(1500),
            http_timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
                .to_string(),
            chrome_executable: None,
            headless: true,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            ocr_dpi: 300,
            ocr_lang: "eng".to_string(),
            ocr_artifact_dir: PathBuf::from("ocr_pages"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            output_dir: std::env::var("OUTPUT_DIR").map(PathBuf::from).unwrap_or(default.output_dir),
            registry_file: std::env::var("REGISTRY_FILE").ok().map(PathBuf::from).or(default.registry_file),
            locator_timeout: env_secs("LOCATOR_TIMEOUT_SECS").unwrap_or(default.locator_timeout),
            download_timeout: env_secs("DOWNLOAD_TIMEOUT_SECS").unwrap_or(default.download_timeout),
            download_settle: std::env::var("DOWNLOAD_SETTLE_MILLIS").ok().and_then(|v| v.parse().ok()).map(Duration::from_millis).unwrap_or(default.download_settle),
            http_timeout: env_secs("HTTP_TIMEOUT_SECS").unwrap_or(default.http_timeout),
            user_agent: std::env::var("USER_AGENT").unwrap_or(default.user_agent),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().map(PathBuf::from).or(default.chrome_executable),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            ocr_dpi: std::env::var("OCR_DPI").ok().and_then(|v| v.parse().ok()).unwrap_or(default.ocr_dpi),
            ocr_lang: std::env::var("OCR_LANG").unwrap_or(default.ocr_lang),
            ocr_artifact_dir: std::env::var("OCR_ARTIFACT_DIR").map(PathBuf::from).unwrap_or(default.ocr_artifact_dir),
        }
    }

    /// 测试和嵌入场景用：指定输出目录，其余取默认值
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}
