use crate::error::ConfigError;
use crate::models::DocVariant;
use crate::services::page_classifier::{BareNumberPolicy, ClassifierConfig};

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的文档数量
    pub max_concurrent_papers: usize,
    /// 页面清单（TOML）存放目录
    pub manifest_folder: String,
    /// 分段报告（JSON）输出目录
    pub output_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 诊断信息（未归属页面、不完整回复）写入的文件
    pub warn_file: String,
    // --- 分类器配置 ---
    /// 试题卷检查的开头行数
    pub qp_window_lines: usize,
    /// 评分标准检查的开头行数
    pub ms_window_lines: usize,
    /// 试题卷跳过的封面/说明页数
    pub qp_leading_pages: usize,
    /// 评分标准跳过的通用评分原则页数
    pub ms_leading_pages: usize,
    /// 裸数字行的处理方式
    pub bare_number_policy: BareNumberPolicy,
    /// 输出图片扩展名
    pub image_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_papers: 8,
            manifest_folder: "manifests".to_string(),
            output_folder: "segmented".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            warn_file: "warn.txt".to_string(),
            qp_window_lines: 10,
            ms_window_lines: 20,
            qp_leading_pages: 2,
            ms_leading_pages: 5,
            bare_number_policy: BareNumberPolicy::NewQuestion,
            image_extension: "png".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_papers: std::env::var("MAX_CONCURRENT_PAPERS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_papers),
            manifest_folder: std::env::var("MANIFEST_FOLDER").unwrap_or(default.manifest_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            warn_file: std::env::var("WARN_FILE").unwrap_or(default.warn_file),
            qp_window_lines: std::env::var("QP_WINDOW_LINES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.qp_window_lines),
            ms_window_lines: std::env::var("MS_WINDOW_LINES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.ms_window_lines),
            qp_leading_pages: std::env::var("QP_LEADING_PAGES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.qp_leading_pages),
            ms_leading_pages: std::env::var("MS_LEADING_PAGES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.ms_leading_pages),
            bare_number_policy: std::env::var("BARE_NUMBER_POLICY").ok().and_then(|v| BareNumberPolicy::from_name(&v)).unwrap_or(default.bare_number_policy),
            image_extension: std::env::var("IMAGE_EXTENSION").unwrap_or(default.image_extension),
        }
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_papers == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MAX_CONCURRENT_PAPERS",
                value: self.max_concurrent_papers.to_string(),
                reason: "必须大于 0",
            });
        }
        if self.qp_window_lines == 0 {
            return Err(ConfigError::InvalidValue {
                key: "QP_WINDOW_LINES",
                value: self.qp_window_lines.to_string(),
                reason: "必须大于 0",
            });
        }
        if self.ms_window_lines == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MS_WINDOW_LINES",
                value: self.ms_window_lines.to_string(),
                reason: "必须大于 0",
            });
        }
        if self.image_extension.is_empty() || self.image_extension.contains(['.', '/']) {
            return Err(ConfigError::InvalidValue {
                key: "IMAGE_EXTENSION",
                value: self.image_extension.clone(),
                reason: "只能是不带点的扩展名",
            });
        }
        Ok(())
    }

    /// 由配置生成分类器配置
    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            qp_window_lines: self.qp_window_lines,
            ms_window_lines: self.ms_window_lines,
            bare_number_policy: self.bare_number_policy,
            ..ClassifierConfig::default()
        }
    }

    /// 某类文档开头需要跳过的页数
    pub fn leading_pages(&self, variant: DocVariant) -> usize {
        match variant {
            DocVariant::QuestionPaper => self.qp_leading_pages,
            DocVariant::MarkScheme => self.ms_leading_pages,
        }
    }
}
