// 该文件是 Wangjian （望见） 项目的一部分。
// src/output/directory_output.rs - 标注图像对目录输出
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

use thiserror::Error;
use tracing::info;

use crate::{
  frame::DetectFrame,
  model::DetectResult,
  output::{
    Render,
    draw::{Draw, Record},
  },
};

const RESIZED_NAME: &str = "resized.jpg";
const ORIGINAL_NAME: &str = "original.jpg";
const RECORD_NAME: &str = "detections.txt";

#[derive(Error, Debug)]
pub enum DirectoryOutputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
}

/// 每个检测周期向目录写入一对标注图像：
/// 模型输入分辨率的 resized.jpg 与原始分辨率的 original.jpg，
/// 下一个周期直接覆盖，相当于窗口里的两块显示面板。
pub struct DirectoryOutput {
  directory: PathBuf,
  draw: Draw,
  record: Option<Record>,
}

impl DirectoryOutput {
  pub fn new(directory: impl AsRef<Path>, draw: Draw) -> Self {
    DirectoryOutput {
      directory: directory.as_ref().to_path_buf(),
      draw,
      record: None,
    }
  }

  /// 同时写出检测结果文本记录
  pub fn with_record(mut self, label_with_name: bool) -> Self {
    self.record = Some(Record { label_with_name });
    self
  }
}

impl<const W: u32, const H: u32> Render<DetectFrame<W, H>, DetectResult> for DirectoryOutput {
  type Error = DirectoryOutputError;

  fn render_result(
    &self,
    frame: &DetectFrame<W, H>,
    result: &DetectResult,
  ) -> Result<(), Self::Error> {
    std::fs::create_dir_all(&self.directory)?;

    let mut resized = frame.resized().clone();
    self.draw.draw_detections_on_image(
      &mut resized,
      result,
      W as f64,
      H as f64,
      frame.ratio_preserved(),
    );
    resized.save(self.directory.join(RESIZED_NAME))?;

    let mut original = frame.original().clone();
    self.draw.draw_detections_on_image(
      &mut original,
      result,
      W as f64,
      H as f64,
      frame.ratio_preserved(),
    );
    original.save(self.directory.join(ORIGINAL_NAME))?;

    if let Some(record) = &self.record {
      record.record(self.draw.labels(), result, &self.directory.join(RECORD_NAME))?;
    }

    info!("标注结果已写入目录: {}", self.directory.display());

    Ok(())
  }
}
