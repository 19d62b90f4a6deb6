//! 考试身份解析 - 业务能力层
//!
//! 把 `9709_s23_qp_12.pdf` 这样的文件名解析为 [`ExamIdentity`]。
//!
//! 文件名形状不符是致命错误；形状正确但某个代码值不认识时映射为 `Unknown`，
//! 因为历史文件的代码并不一致，宁可带着 `Unknown` 往下走也不要丢掉整份文档。

use std::path::Path;
use std::sync::LazyLock;

use phf::phf_map;
use regex::Regex;

use crate::error::IdentityError;
use crate::models::{Component, DocVariant, ExamIdentity, Session};

/// `<科目>_<考试季><年份>_[qp_|ms_]<组成部分>[<卷别>].pdf`
static FILENAME_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<subject>\d{4})_(?P<session>[a-z])(?P<year>\d{2})_(?:(?P<marker>qp|ms)_)?(?P<component>\d)(?P<variant>\d)?\.pdf$",
    )
    .expect("valid filename regex")
});

static SESSIONS: phf::Map<&'static str, Session> = phf_map! {
    "m" => Session::FebMarch,
    "s" => Session::MayJune,
    "w" => Session::OctNov,
};

static COMPONENTS: phf::Map<&'static str, Component> = phf_map! {
    "1" => Component::Pure1,
    "2" => Component::Pure2,
    "3" => Component::Pure3,
    "4" => Component::Mechanics,
    "5" => Component::Stats1,
    "6" => Component::Stats2,
};

/// 解析文件名
///
/// 路径中的目录部分会被忽略。
pub fn parse(filename: &str) -> Result<ExamIdentity, IdentityError> {
    let base_name = Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();

    let caps = FILENAME_SHAPE
        .captures(&base_name)
        .ok_or_else(|| IdentityError::MalformedFilename {
            file_name: filename.to_string(),
        })?;

    let session_code = caps["session"].to_ascii_lowercase();
    let session = SESSIONS
        .get(session_code.as_str())
        .copied()
        .unwrap_or(Session::Unknown);

    // 两位年份一律属于 20xx
    let year = format!("20{}", &caps["year"]);

    let component = COMPONENTS
        .get(&caps["component"])
        .copied()
        .unwrap_or(Component::Unknown);

    Ok(ExamIdentity {
        subject_code: caps["subject"].to_string(),
        session,
        year,
        component,
        paper_variant: caps
            .name("variant")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        doc_marker: caps
            .name("marker")
            .and_then(|m| DocVariant::from_marker(m.as_str())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_question_paper() {
        let identity = parse("9709_s23_qp_12.pdf").unwrap();
        assert_eq!(identity.subject_code, "9709");
        assert_eq!(identity.session, Session::MayJune);
        assert_eq!(identity.session.label(), "May/June");
        assert_eq!(identity.year, "2023");
        assert_eq!(identity.component, Component::Pure1);
        assert_eq!(identity.component.name(), "Pure 1");
        assert_eq!(identity.paper_variant, "2");
        assert_eq!(identity.doc_marker, Some(DocVariant::QuestionPaper));
    }

    #[test]
    fn test_parse_uppercase_mark_scheme() {
        let identity = parse("9709_S24_ms_32.pdf").unwrap();
        assert_eq!(identity.session, Session::MayJune);
        assert_eq!(identity.year, "2024");
        assert_eq!(identity.component, Component::Pure3);
        assert_eq!(identity.paper_variant, "2");
        assert_eq!(identity.doc_marker, Some(DocVariant::MarkScheme));
    }

    #[test]
    fn test_parse_without_marker_or_variant() {
        let identity = parse("9709_w21_4.pdf").unwrap();
        assert_eq!(identity.session, Session::OctNov);
        assert_eq!(identity.component, Component::Mechanics);
        assert_eq!(identity.paper_variant, "");
        assert_eq!(identity.doc_marker, None);
    }

    #[test]
    fn test_parse_ignores_directories() {
        let identity = parse("answers/2024/9709_m24_ms_52.pdf").unwrap();
        assert_eq!(identity.session, Session::FebMarch);
        assert_eq!(identity.component, Component::Stats1);
    }

    #[test]
    fn test_unrecognised_codes_map_to_unknown() {
        let identity = parse("9709_x07_qp_92.pdf").unwrap();
        assert_eq!(identity.session, Session::Unknown);
        assert_eq!(identity.year, "2007");
        assert_eq!(identity.component, Component::Unknown);
        assert!(identity.has_unknown_fields());
    }

    #[test]
    fn test_every_two_digit_year_is_20xx() {
        assert_eq!(parse("9709_s09_qp_12.pdf").unwrap().year, "2009");
        assert_eq!(parse("9709_w00_ms_31.pdf").unwrap().year, "2000");
        assert_eq!(parse("9709_m99_qp_22.pdf").unwrap().year, "2099");
        assert!(!parse("9709_s09_qp_12.pdf").unwrap().has_unknown_fields());
    }

    #[test]
    fn test_malformed_filename_is_fatal() {
        for bad in ["notes.pdf", "9709_s23_qp_12.png", "9709-s23-qp-12.pdf", "9709_s2023_qp_12.pdf", ""] {
            assert_eq!(
                parse(bad),
                Err(IdentityError::MalformedFilename {
                    file_name: bad.to_string()
                }),
                "{} 应该解析失败",
                bad
            );
        }
    }
}
