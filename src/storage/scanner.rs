use crate::config::{ScanConfig, ScanMode};
use crate::error::StorageError;
use crate::models::{ImageSource, PathMetadata, RunContext};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// 按扫描模式收集待识别图片
pub fn scan_images(image_folder: &Path, scan: &ScanConfig, ctx: &RunContext) -> Result<Vec<ImageSource>, StorageError> {
    let images = match scan.mode {
        ScanMode::Flat => scan_flat(image_folder)?,
        ScanMode::Dated => scan_dated(image_folder, scan, ctx)?,
    };
    tracing::info!("扫描完成: {} 张图片", images.len());
    Ok(images)
}

/// 图片直接位于目录下，元数据只有图片名
pub fn scan_flat(folder: &Path) -> Result<Vec<ImageSource>, StorageError> {
    Ok(list_sorted(folder)?
        .into_iter()
        .filter(|p| p.is_file() && is_image_file(p))
        .map(|path| {
            let metadata = PathMetadata::for_image(file_name(&path));
            ImageSource { path, metadata }
        })
        .collect())
}

/// 日期/平台/订单类型/店铺ID/图片 的层级目录
pub fn scan_dated(image_folder: &Path, scan: &ScanConfig, ctx: &RunContext) -> Result<Vec<ImageSource>, StorageError> {
    let batch = ctx.batch_folder_name(scan.days_back);
    let base = image_folder.join(&batch);
    if !base.is_dir() {
        tracing::warn!("⚠️ 无 {} 数据！请检查目录结构。", batch);
        return Ok(Vec::new());
    }

    warn_unknown(&base, &scan.platforms, "平台")?;

    let mut images = Vec::new();
    for platform in &scan.platforms {
        let platform_path = base.join(platform);
        if !platform_path.is_dir() {
            continue;
        }
        warn_unknown(&platform_path, &scan.order_types, "订单类型")?;

        for order_type in &scan.order_types {
            let type_path = platform_path.join(order_type);
            if !type_path.is_dir() {
                continue;
            }

            for shop_path in list_sorted(&type_path)? {
                let shop_id = file_name(&shop_path);
                if !shop_path.is_dir() || !is_shop_id(&shop_id) {
                    continue;
                }

                for path in list_sorted(&shop_path)? {
                    if !path.is_file() || !is_image_file(&path) {
                        continue;
                    }
                    let metadata = PathMetadata {
                        image_name: file_name(&path),
                        batch_date: Some(batch.clone()),
                        platform: Some(platform.clone()),
                        order_type: Some(order_type.clone()),
                        shop_id: Some(shop_id.clone()),
                    };
                    images.push(ImageSource { path, metadata });
                }
            }
        }
    }

    Ok(images)
}

fn is_shop_id(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_digit())
}

fn warn_unknown(dir: &Path, allowed: &[String], label: &str) -> Result<(), StorageError> {
    let allowed: HashSet<&str> = allowed.iter().map(String::as_str).collect();
    for path in list_sorted(dir)? {
        let name = file_name(&path);
        if !allowed.contains(name.as_str()) {
            tracing::warn!("⚠️ {} 下有未配置的{}目录 {}，已忽略。", dir.display(), label, name);
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn list_sorted(dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let read_err = |source: std::io::Error| StorageError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        entries.push(entry.map_err(read_err)?.path());
    }
    entries.sort();
    Ok(entries)
}
