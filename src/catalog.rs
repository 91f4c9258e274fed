// 该文件是 Wangjian （望见） 项目的一部分。
// src/catalog.rs - 模型与图片目录扫描
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Wangjian 项目贡献者

use std::path::{Path, PathBuf};

use tracing::debug;

const MODEL_EXTENSION: &str = "onnx";
const IMAGE_EXTENSION: &str = "jpg";

/// 可选模型与可轮换图片的只读清单。
///
/// 图片游标在达到或超过图片数量时回卷到 0。
#[derive(Debug, Clone)]
pub struct Catalog {
  models: Vec<PathBuf>,
  images: Vec<PathBuf>,
  img_ix: usize,
}

impl Catalog {
  /// 扫描模型目录下的 *.onnx 与图片目录下的 *.jpg。
  /// 列表排序以保证顺序稳定。
  pub fn scan(
    model_dir: impl AsRef<Path>,
    image_dir: impl AsRef<Path>,
  ) -> std::io::Result<Self> {
    let models = scan_extension(model_dir.as_ref(), MODEL_EXTENSION)?;
    let images = scan_extension(image_dir.as_ref(), IMAGE_EXTENSION)?;

    debug!(
      "目录扫描完成: {} 个模型, {} 张图片",
      models.len(),
      images.len()
    );

    Ok(Catalog {
      models,
      images,
      img_ix: 0,
    })
  }

  pub fn models(&self) -> &[PathBuf] {
    &self.models
  }

  pub fn image_count(&self) -> usize {
    self.images.len()
  }

  /// 游标当前指向的图片
  pub fn image(&mut self) -> Option<&Path> {
    if self.img_ix >= self.images.len() {
      self.img_ix = 0;
    }
    self.images.get(self.img_ix).map(PathBuf::as_path)
  }

  /// 游标前进一格后返回指向的图片
  pub fn next_image(&mut self) -> Option<&Path> {
    self.img_ix += 1;
    self.image()
  }
}

/// 列出目录下的全部 *.jpg（排序后）
pub fn scan_images(dir: impl AsRef<Path>) -> std::io::Result<Vec<PathBuf>> {
  scan_extension(dir.as_ref(), IMAGE_EXTENSION)
}

fn scan_extension(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
  let mut paths = Vec::new();

  for entry in std::fs::read_dir(dir)? {
    let entry = entry?;
    let path = entry.path();
    if entry.file_type()?.is_file()
      && path.extension().map(|e| e == extension).unwrap_or(false)
    {
      paths.push(path);
    }
  }

  paths.sort();
  Ok(paths)
}

#[cfg(test)]
mod tests {
  use super::*;

  struct TempDir(PathBuf);

  impl TempDir {
    fn new(tag: &str) -> Self {
      let dir = std::env::temp_dir().join(format!("wangjian-catalog-{}-{}", tag, std::process::id()));
      std::fs::create_dir_all(&dir).unwrap();
      TempDir(dir)
    }

    fn touch(&self, name: &str) {
      std::fs::write(self.0.join(name), b"").unwrap();
    }
  }

  impl Drop for TempDir {
    fn drop(&mut self) {
      let _ = std::fs::remove_dir_all(&self.0);
    }
  }

  #[test]
  fn scan_filters_by_extension_and_sorts() {
    let models = TempDir::new("models");
    models.touch("b.onnx");
    models.touch("a.onnx");
    models.touch("notes.txt");
    let images = TempDir::new("images");
    images.touch("2.jpg");
    images.touch("1.jpg");
    images.touch("skip.png");

    let catalog = Catalog::scan(&models.0, &images.0).unwrap();

    let names: Vec<_> = catalog
      .models()
      .iter()
      .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
      .collect();
    assert_eq!(names, ["a.onnx", "b.onnx"]);
    assert_eq!(catalog.image_count(), 2);
  }

  #[test]
  fn image_cursor_wraps_to_zero() {
    let models = TempDir::new("wrap-models");
    let images = TempDir::new("wrap-images");
    images.touch("1.jpg");
    images.touch("2.jpg");

    let mut catalog = Catalog::scan(&models.0, &images.0).unwrap();

    let first = catalog.image().unwrap().to_path_buf();
    let second = catalog.next_image().unwrap().to_path_buf();
    assert_ne!(first, second);

    // 越过末尾后回卷到第一张
    let wrapped = catalog.next_image().unwrap().to_path_buf();
    assert_eq!(wrapped, first);
  }

  #[test]
  fn empty_image_list_yields_none() {
    let models = TempDir::new("empty-models");
    let images = TempDir::new("empty-images");

    let mut catalog = Catalog::scan(&models.0, &images.0).unwrap();
    assert!(catalog.image().is_none());
    assert!(catalog.next_image().is_none());
  }
}
