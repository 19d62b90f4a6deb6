use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件名无法解析为考试身份
    #[error("考试身份错误: {0}")]
    Identity(#[from] IdentityError),
    /// 生成式回复解析错误
    #[error("回复解析错误: {0}")]
    Reply(#[from] ReplyError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 考试身份解析错误
///
/// 文件名形状不对是致命的（整份文档放弃），单个代码值不认识则映射为 `Unknown`，不走这里。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// 文件名不符合任何已知形状
    #[error("无法识别的文件名格式: {file_name}")]
    MalformedFilename { file_name: String },
}

/// 回复解析错误（按记录可恢复）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    /// 缺少必需的行
    #[error("回复不完整，缺少字段: {}", missing.join(", "))]
    IncompleteReply { missing: Vec<&'static str> },
    /// difficulty 值不在 Easy/Medium/Hard 之内
    #[error("无效的难度值: {value}")]
    InvalidDifficulty { value: String },
}

impl ReplyError {
    /// 所有回复错误都只影响单条记录
    pub fn is_recoverable(&self) -> bool {
        true
    }
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 页面清单 TOML 解析失败
    #[error("清单解析失败 ({path}): {source}")]
    ManifestParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 报告序列化失败
    #[error("报告序列化失败 ({path}): {source}")]
    ReportSerializeFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 配置错误（由 `Config::validate` 返回，编排层用 anyhow 包装）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 配置值不合法
    #[error("配置项 {key} 的值 '{value}' 不合法: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_reply_lists_missing_fields() {
        let err = ReplyError::IncompleteReply {
            missing: vec!["topic", "ai_explanation"],
        };
        assert!(err.to_string().contains("topic, ai_explanation"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_identity_error_wraps_into_app_error() {
        let err: AppError = IdentityError::MalformedFilename {
            file_name: "notes.pdf".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::Identity(_)));
        assert!(err.to_string().contains("notes.pdf"));
    }
}
