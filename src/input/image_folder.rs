// 该文件是 Wangjian （望见） 项目的一部分。
// src/input/image_folder.rs - 图片目录输入
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

use std::path::PathBuf;

use anyhow::Context;
use image::ImageReader;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, catalog, frame::DetectFrame};

#[derive(Error, Debug)]
pub enum ImageFolderInputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 按排序顺序遍历目录下全部 *.jpg 的输入源
pub struct ImageFolderInput {
  paths: Vec<PathBuf>,
}

impl FromUrlWithScheme for ImageFolderInput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for ImageFolderInput {
  type Error = ImageFolderInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ImageFolderInputError::SchemeMismatch);
    }

    let paths = catalog::scan_images(url.path())?;
    debug!("图片目录 {} 下发现 {} 张图片", url.path(), paths.len());

    Ok(ImageFolderInput { paths })
  }
}

impl ImageFolderInput {
  pub fn len(&self) -> usize {
    self.paths.len()
  }

  pub fn is_empty(&self) -> bool {
    self.paths.is_empty()
  }

  pub fn into_frames<const W: u32, const H: u32>(self, preserve_ratio: bool) -> Frames<W, H> {
    Frames {
      paths: self.paths.into_iter(),
      preserve_ratio,
    }
  }
}

pub struct Frames<const W: u32, const H: u32> {
  paths: std::vec::IntoIter<PathBuf>,
  preserve_ratio: bool,
}

impl<const W: u32, const H: u32> Iterator for Frames<W, H> {
  type Item = anyhow::Result<DetectFrame<W, H>>;

  fn next(&mut self) -> Option<Self::Item> {
    let path = self.paths.next()?;
    let result = ImageReader::open(&path)
      .map_err(anyhow::Error::from)
      .and_then(|reader| reader.decode().map_err(anyhow::Error::from))
      .with_context(|| format!("解码图片失败: {}", path.display()))
      .map(|image| DetectFrame::from_image(image.into(), self.preserve_ratio));
    Some(result)
  }
}
