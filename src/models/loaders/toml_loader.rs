use crate::error::{AppError, AppResult, FileError};
use crate::models::manifest::PageManifest;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载页面清单
pub async fn load_manifest(toml_file_path: &Path) -> AppResult<PageManifest> {
    let path_display = toml_file_path.display().to_string();

    if !toml_file_path.exists() {
        return Err(FileError::NotFound { path: path_display }.into());
    }

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_display, e))?;

    let mut manifest: PageManifest =
        toml::from_str(&content).map_err(|source| FileError::ManifestParseFailed {
            path: path_display.clone(),
            source,
        })?;

    // 渲染器不保证按页序写出
    manifest.pages.sort_by_key(|page| page.index);

    Ok(manifest.with_file_path(path_display))
}

/// 从文件夹中加载所有页面清单
///
/// 单个清单解析失败只记录警告并跳过；文件夹不存在则报错。
/// 返回结果按文件名排序，保证批处理顺序稳定。
pub async fn load_all_manifests(folder_path: &str) -> AppResult<Vec<PageManifest>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: folder_path.to_string(),
            source,
        })?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| FileError::ReadFailed {
            path: folder_path.to_string(),
            source,
        })?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut manifests = Vec::new();
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_manifest(&path).await {
            Ok(manifest) => {
                tracing::info!("成功加载 {} 页", manifest.pages.len());
                manifests.push(manifest);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::DocVariant;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
file_name = "9709_s23_ms_12.pdf"
doc_variant = "mark_scheme"

[[pages]]
index = 6
text = "continued"
image = "renders/p6.png"

[[pages]]
index = 5
text = "1(a) B1"
image = "renders/p5.png"
"#;

    #[test]
    fn test_load_manifest_sorts_pages() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.toml");
        std::fs::write(&path, MANIFEST).unwrap();

        let manifest = tokio_test::block_on(load_manifest(&path)).unwrap();
        assert_eq!(manifest.doc_variant, Some(DocVariant::MarkScheme));
        assert_eq!(manifest.pages[0].index, 5);
        assert_eq!(manifest.pages[1].index, 6);
        assert_eq!(manifest.file_stem(), "9709_s23_ms_12");
        assert!(manifest.file_path.is_some());
    }

    #[test]
    fn test_load_all_manifests_skips_broken_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("good.toml"), MANIFEST).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "file_name = ").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let manifests =
            tokio_test::block_on(load_all_manifests(dir.path().to_str().unwrap())).unwrap();
        assert_eq!(manifests.len(), 1);
        assert_eq!(manifests[0].file_name, "9709_s23_ms_12.pdf");
    }

    #[test]
    fn test_missing_folder_is_an_error() {
        let result = tokio_test::block_on(load_all_manifests(
            "/nonexistent/exam_paper_segmenter/manifests",
        ));
        assert!(matches!(
            result,
            Err(AppError::File(FileError::DirectoryNotFound { .. }))
        ));
    }

    #[test]
    fn test_missing_manifest_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = tokio_test::block_on(load_manifest(&dir.path().join("absent.toml")));
        assert!(matches!(
            result,
            Err(AppError::File(FileError::NotFound { .. }))
        ));
    }
}
