// 该文件是 Wangjian （望见） 项目的一部分。
// src/output/mod.rs - 输出模块
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

pub mod draw;
mod directory_output;
mod save_image_file;

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::{FromUrl, frame::DetectFrame, model::DetectResult, output::draw::Draw};

pub use directory_output::{DirectoryOutput, DirectoryOutputError};
pub use save_image_file::{SaveImageFileError, SaveImageFileOutput};

pub trait Render<F, D> {
  type Error;
  fn render_result(&self, frame: &F, result: &D) -> Result<(), Self::Error>;
}

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("不支持的输出方案: {0}")]
  UnsupportedScheme(String),
  #[error(transparent)]
  Image(#[from] SaveImageFileError),
  #[error(transparent)]
  Folder(#[from] DirectoryOutputError),
}

const IMAGE_SCHEME: &str = "image";
const FOLDER_SCHEME: &str = "folder";

/// 从 URL 解析出的输出端点，注入绘制器后得到可用的输出
pub enum OutputTarget {
  /// image:path - 标注后的原图写入该文件
  Image(PathBuf),
  /// folder:dir[?record[=id]] - 标注图像对写入该目录
  Folder {
    dir: PathBuf,
    record: Option<bool>,
  },
}

impl FromUrl for OutputTarget {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      IMAGE_SCHEME => Ok(OutputTarget::Image(PathBuf::from(url.path()))),
      FOLDER_SCHEME => {
        let record = url
          .query_pairs()
          .find(|(k, _)| k == "record")
          .map(|(_, v)| v != "id");

        Ok(OutputTarget::Folder {
          dir: PathBuf::from(url.path()),
          record,
        })
      }
      other => Err(OutputError::UnsupportedScheme(other.to_string())),
    }
  }
}

impl OutputTarget {
  pub fn into_output(self, draw: Draw) -> OutputWrapper {
    match self {
      OutputTarget::Image(path) => OutputWrapper::Image(SaveImageFileOutput::new(path, draw)),
      OutputTarget::Folder { dir, record } => {
        let mut output = DirectoryOutput::new(dir, draw);
        if let Some(label_with_name) = record {
          output = output.with_record(label_with_name);
        }
        OutputWrapper::Folder(output)
      }
    }
  }
}

/// 按 URL 方案分派的输出写入器
pub enum OutputWrapper {
  Image(SaveImageFileOutput),
  Folder(DirectoryOutput),
}

impl<const W: u32, const H: u32> Render<DetectFrame<W, H>, DetectResult> for OutputWrapper {
  type Error = OutputError;

  fn render_result(
    &self,
    frame: &DetectFrame<W, H>,
    result: &DetectResult,
  ) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::Image(output) => output.render_result(frame, result)?,
      OutputWrapper::Folder(output) => output.render_result(frame, result)?,
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn output_target_parses_schemes() {
    let url = Url::parse("image:out/annotated.jpg").unwrap();
    assert!(matches!(
      OutputTarget::from_url(&url),
      Ok(OutputTarget::Image(_))
    ));

    let url = Url::parse("folder:out?record=id").unwrap();
    match OutputTarget::from_url(&url) {
      Ok(OutputTarget::Folder { record, .. }) => assert_eq!(record, Some(false)),
      other => panic!("意外的解析结果: {:?}", other.is_ok()),
    }

    let url = Url::parse("rtsp://example/stream").unwrap();
    assert!(matches!(
      OutputTarget::from_url(&url),
      Err(OutputError::UnsupportedScheme(_))
    ));
  }
}
