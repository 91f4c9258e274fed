// 该文件是 Wangjian （望见） 项目的一部分。
// src/model.rs - 模型与检测结果
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

use std::path::Path;

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&mut self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

#[derive(Debug, Clone)]
pub struct DetectItem {
  pub class_id: u32,
  pub score: f32,
  /// 模型输入空间内的归一化坐标 [x_min, y_min, x_max, y_max]
  pub bbox: [f32; 4],
}

#[derive(Debug, Clone, Default)]
pub struct DetectResult {
  pub items: Box<[DetectItem]>,
}

impl DetectResult {
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }
}

/// 目标图像上的像素矩形
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
  pub x_min: i32,
  pub y_min: i32,
  pub x_max: i32,
  pub y_max: i32,
}

/// 从模型输入空间映射到目标图像像素空间的缩放因子。
///
/// 预处理保持了纵横比时，只由受限轴推出一个统一因子，
/// 对两个轴同用，相当于撤销信箱填充；否则两轴独立缩放。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxScale {
  pub x: f64,
  pub y: f64,
}

impl BoxScale {
  pub fn for_target(
    target_w: u32,
    target_h: u32,
    input_w: f64,
    input_h: f64,
    ratio_preserved: bool,
  ) -> Self {
    if ratio_preserved {
      let target_ratio = target_w as f64 / target_h as f64;
      let input_ratio = input_w / input_h;

      let scale = if input_ratio <= target_ratio {
        target_w as f64 / input_w
      } else {
        target_h as f64 / input_h
      };
      BoxScale { x: scale, y: scale }
    } else {
      BoxScale {
        x: target_w as f64 / input_w,
        y: target_h as f64 / input_h,
      }
    }
  }
}

/// 把归一化检测框换算到目标图像的像素矩形
pub fn rescale_bbox(bbox: &[f32; 4], input_w: f64, input_h: f64, scale: &BoxScale) -> PixelRect {
  let x_min = (bbox[0] as f64).clamp(0.0, 1.0) * input_w * scale.x;
  let y_min = (bbox[1] as f64).clamp(0.0, 1.0) * input_h * scale.y;
  let x_max = (bbox[2] as f64).clamp(0.0, 1.0) * input_w * scale.x;
  let y_max = (bbox[3] as f64).clamp(0.0, 1.0) * input_h * scale.y;

  PixelRect {
    x_min: x_min.floor() as i32,
    y_min: y_min.floor() as i32,
    x_max: x_max.ceil() as i32,
    y_max: y_max.ceil() as i32,
  }
}

/// 从换行分隔的文本文件加载一次的类别标签表
#[derive(Debug, Clone)]
pub struct LabelMap {
  labels: Vec<String>,
}

impl LabelMap {
  pub fn from_labels(labels: Vec<String>) -> Self {
    LabelMap { labels }
  }

  pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
    let text = std::fs::read_to_string(path)?;
    let labels = text.lines().map(str::to_string).collect();
    Ok(LabelMap { labels })
  }

  pub fn get(&self, class_id: u32) -> Option<&str> {
    self.labels.get(class_id as usize).map(String::as_str)
  }

  /// 标签缺失时退回类别编号
  pub fn name(&self, class_id: u32) -> String {
    match self.get(class_id) {
      Some(label) => label.to_string(),
      None => class_id.to_string(),
    }
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }
}

mod ssd;
pub use self::ssd::{Ssd, SsdBuilder, SsdError, postprocess};

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn preserved_ratio_scales_from_constraining_width() {
    // 宽图：宽是信箱缩放时的受限轴
    let scale = BoxScale::for_target(640, 360, 320.0, 320.0, true);
    assert_eq!(scale.x, 2.0);
    assert_eq!(scale.y, 2.0);
  }

  #[test]
  fn preserved_ratio_scales_from_constraining_height() {
    // 高图：换成高作为受限轴
    let scale = BoxScale::for_target(360, 640, 320.0, 320.0, true);
    assert_eq!(scale.x, 1.125);
    assert_eq!(scale.y, 1.125);
  }

  #[test]
  fn stretched_mode_scales_axes_independently() {
    let scale = BoxScale::for_target(640, 160, 320.0, 320.0, false);
    assert_eq!(scale.x, 2.0);
    assert_eq!(scale.y, 0.5);
  }

  #[test]
  fn full_extent_box_maps_to_full_original_extent() {
    // 受限轴上占满模型输入的框必须映射到原图的整个该轴
    let scale = BoxScale::for_target(640, 360, 320.0, 320.0, true);
    let rect = rescale_bbox(&[0.0, 0.0, 1.0, 1.0], 320.0, 320.0, &scale);
    assert_eq!(rect.x_min, 0);
    assert_eq!(rect.x_max, 640);
  }

  #[test]
  fn bbox_edges_are_clamped_to_unit_range() {
    let scale = BoxScale { x: 1.0, y: 1.0 };
    let rect = rescale_bbox(&[-0.5, -0.5, 1.5, 1.5], 320.0, 320.0, &scale);
    assert_eq!(
      rect,
      PixelRect {
        x_min: 0,
        y_min: 0,
        x_max: 320,
        y_max: 320
      }
    );
  }

  #[test]
  fn label_map_falls_back_to_class_id() {
    let map = LabelMap {
      labels: vec!["person".into(), "bicycle".into()],
    };
    assert_eq!(map.name(1), "bicycle");
    assert_eq!(map.name(42), "42");
  }
}
