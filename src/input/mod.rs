// 该文件是 Wangjian （望见） 项目的一部分。
// src/input/mod.rs - 输入源模块
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

mod image_file;
mod image_folder;

use thiserror::Error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::DetectFrame};

pub use image_file::{ImageFileInput, ImageFileInputError};
pub use image_folder::{ImageFolderInput, ImageFolderInputError};

#[derive(Error, Debug)]
pub enum InputError {
  #[error("不支持的输入方案: {0}")]
  UnsupportedScheme(String),
  #[error(transparent)]
  Image(#[from] ImageFileInputError),
  #[error(transparent)]
  Folder(#[from] ImageFolderInputError),
}

/// 按 URL 方案分派的输入源
pub enum InputWrapper {
  Image(ImageFileInput),
  Folder(ImageFolderInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      ImageFileInput::SCHEME => Ok(InputWrapper::Image(ImageFileInput::from_url(url)?)),
      ImageFolderInput::SCHEME => Ok(InputWrapper::Folder(ImageFolderInput::from_url(url)?)),
      other => Err(InputError::UnsupportedScheme(other.to_string())),
    }
  }
}

impl InputWrapper {
  pub fn into_frames<const W: u32, const H: u32>(self, preserve_ratio: bool) -> FrameIter<W, H> {
    match self {
      InputWrapper::Image(input) => FrameIter::Image(input.into_frames(preserve_ratio)),
      InputWrapper::Folder(input) => FrameIter::Folder(input.into_frames(preserve_ratio)),
    }
  }
}

pub enum FrameIter<const W: u32, const H: u32> {
  Image(image_file::Frames<W, H>),
  Folder(image_folder::Frames<W, H>),
}

impl<const W: u32, const H: u32> Iterator for FrameIter<W, H> {
  type Item = anyhow::Result<DetectFrame<W, H>>;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      FrameIter::Image(frames) => frames.next(),
      FrameIter::Folder(frames) => frames.next(),
    }
  }
}
