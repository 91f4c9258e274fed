// 该文件是 Wangjian （望见） 项目的一部分。
// src/input/image_file.rs - 图像文件输入
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

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::DetectFrame};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
}

/// 单张静态图片输入
pub struct ImageFileInput {
  image: Option<RgbImage>,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    let path = url.path();
    let image = ImageReader::open(path)?.decode()?;

    Ok(ImageFileInput {
      image: Some(image.into()),
    })
  }
}

impl ImageFileInput {
  pub fn into_frames<const W: u32, const H: u32>(self, preserve_ratio: bool) -> Frames<W, H> {
    Frames {
      image: self.image,
      preserve_ratio,
    }
  }
}

pub struct Frames<const W: u32, const H: u32> {
  image: Option<RgbImage>,
  preserve_ratio: bool,
}

impl<const W: u32, const H: u32> Iterator for Frames<W, H> {
  type Item = anyhow::Result<DetectFrame<W, H>>;

  fn next(&mut self) -> Option<Self::Item> {
    let preserve_ratio = self.preserve_ratio;
    self
      .image
      .take()
      .map(|image| Ok(DetectFrame::from_image(image, preserve_ratio)))
  }
}
