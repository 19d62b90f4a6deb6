use serde::{Deserialize, Serialize};

/// 试卷组成部分（Component）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    /// 纯数 1
    Pure1,
    /// 纯数 2
    Pure2,
    /// 纯数 3
    Pure3,
    /// 力学
    Mechanics,
    /// 统计 1
    Stats1,
    /// 统计 2
    Stats2,
    /// 无法识别的代码
    Unknown,
}

impl Component {
    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Component::Pure1 => "Pure 1",
            Component::Pure2 => "Pure 2",
            Component::Pure3 => "Pure 3",
            Component::Mechanics => "Mechanics",
            Component::Stats1 => "Stats 1",
            Component::Stats2 => "Stats 2",
            Component::Unknown => "Unknown",
        }
    }

    /// 用于图片文件名的短形式
    pub fn slug(self) -> &'static str {
        match self {
            Component::Pure1 => "pure1",
            Component::Pure2 => "pure2",
            Component::Pure3 => "pure3",
            Component::Mechanics => "mechanics",
            Component::Stats1 => "stats1",
            Component::Stats2 => "stats2",
            Component::Unknown => "unknown",
        }
    }

    pub fn is_unknown(self) -> bool {
        self == Component::Unknown
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 考试季
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Session {
    FebMarch,
    MayJune,
    OctNov,
    Unknown,
}

impl Session {
    /// 获取标准名称
    pub fn label(self) -> &'static str {
        match self {
            Session::FebMarch => "Feb/March",
            Session::MayJune => "May/June",
            Session::OctNov => "Oct/Nov",
            Session::Unknown => "Unknown",
        }
    }

    /// 用于图片文件名的短形式
    pub fn slug(self) -> &'static str {
        match self {
            Session::FebMarch => "febmarch",
            Session::MayJune => "mayjune",
            Session::OctNov => "octnov",
            Session::Unknown => "unknown",
        }
    }

    pub fn is_unknown(self) -> bool {
        self == Session::Unknown
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 文档类型：试题卷或评分标准
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocVariant {
    QuestionPaper,
    MarkScheme,
}

impl DocVariant {
    /// 从文件名中的 `qp` / `ms` 标记解析
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker.to_ascii_lowercase().as_str() {
            "qp" => Some(DocVariant::QuestionPaper),
            "ms" => Some(DocVariant::MarkScheme),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocVariant::QuestionPaper => write!(f, "试题卷"),
            DocVariant::MarkScheme => write!(f, "评分标准"),
        }
    }
}
