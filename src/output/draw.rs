// 该文件是 Wangjian （望见） 项目的一部分。
// src/output/draw.rs - 检测结果可视化
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

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use thiserror::Error;

use crate::model::{BoxScale, DetectItem, DetectResult, LabelMap, PixelRect, rescale_bbox};

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 20.0;
const LABEL_TEXT_HEIGHT: i32 = 24;
const LABEL_CHAR_WIDTH: f32 = 11.0; // 每字符平均宽度（粗略估计）
const LABEL_TEXT_VERTICAL_PADDING: i32 = 2;
const LABEL_COLOR: [u8; 3] = [0, 0, 255]; // 蓝色

const BORDER_THICKNESS: i32 = 2;

#[derive(Error, Debug)]
pub enum DrawError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("无法加载字体文件: {0}")]
  FontError(String),
}

pub struct Draw {
  font_size: f32,
  label_text_height: i32,
  label_char_width: f32,
  label_text_vertical_padding: i32,
  font: FontVec,
  labels: LabelMap,
  label_color: [u8; 3],
}

impl Draw {
  pub fn new(font: FontVec, labels: LabelMap) -> Self {
    Self {
      font_size: LABEL_FONT_SIZE,
      label_text_height: LABEL_TEXT_HEIGHT,
      label_char_width: LABEL_CHAR_WIDTH,
      label_text_vertical_padding: LABEL_TEXT_VERTICAL_PADDING,
      label_color: LABEL_COLOR,
      font,
      labels,
    }
  }

  /// 从 TTF 文件加载字体
  pub fn load(font_path: impl AsRef<Path>, labels: LabelMap) -> Result<Self, DrawError> {
    let font_data = std::fs::read(font_path)?;
    let font =
      FontVec::try_from_vec(font_data).map_err(|e| DrawError::FontError(e.to_string()))?;
    Ok(Draw::new(font, labels))
  }

  pub fn labels(&self) -> &LabelMap {
    &self.labels
  }

  /// 在目标图像上绘制全部检测框与标签。
  ///
  /// 检测框是模型输入空间内的归一化坐标，按信箱缩放策略
  /// 换算到目标图像的像素空间后再绘制。
  pub fn draw_detections_on_image(
    &self,
    image: &mut RgbImage,
    result: &DetectResult,
    input_w: f64,
    input_h: f64,
    ratio_preserved: bool,
  ) {
    let scale = BoxScale::for_target(
      image.width(),
      image.height(),
      input_w,
      input_h,
      ratio_preserved,
    );

    for DetectItem {
      class_id,
      score,
      bbox,
    } in result.items.iter()
    {
      let rect = rescale_bbox(bbox, input_w, input_h, &scale);
      self.draw_rect_with_label(image, rect, *class_id, *score);
    }
  }

  fn draw_rect_with_label(&self, image: &mut RgbImage, rect: PixelRect, class_id: u32, score: f32) {
    let (w, h) = (image.width() as i32, image.height() as i32);

    let x_min = rect.x_min.clamp(0, w - 1);
    let y_min = rect.y_min.clamp(0, h - 1);
    let x_max = rect.x_max.clamp(0, w - 1);
    let y_max = rect.y_max.clamp(0, h - 1);

    if x_min >= x_max || y_min >= y_max {
      return;
    }

    draw_box_border(
      image,
      PixelRect {
        x_min,
        y_min,
        x_max,
        y_max,
      },
      self.label_color,
    );

    // 标签文本
    let label = format!("{}: {}%", self.labels.name(class_id), (score * 100.0) as i32);

    let px_scale = PxScale::from(self.font_size);
    let text_color = Rgb([255u8, 255u8, 255u8]); // 白色文本

    // 估算文本大小（粗略估计）
    let text_width = (label.len() as f32 * self.label_char_width) as i32;
    let text_height = self.label_text_height;

    // 标签背景放在边框上方
    let label_x = x_min.max(0);
    let label_y = (y_min - text_height).max(0);

    // 确保标签不超出图像边界
    let max_width = (w - label_x).max(0);
    let label_width = text_width.min(max_width) as u32;
    let label_height = text_height as u32;

    if label_width > 0 && label_height > 0 {
      let rect = imageproc::rect::Rect::at(label_x, label_y).of_size(label_width, label_height);
      draw_filled_rect_mut(image, rect, Rgb(self.label_color));

      draw_text_mut(
        image,
        text_color,
        label_x,
        label_y + self.label_text_vertical_padding,
        px_scale,
        &self.font,
        &label,
      );
    }
  }
}

/// 绘制 2 像素宽的矩形边框，矩形必须已钳制到图像范围内
pub fn draw_box_border(image: &mut RgbImage, rect: PixelRect, color: [u8; 3]) {
  let (w, h) = (image.width() as i32, image.height() as i32);

  for thickness in 0..BORDER_THICKNESS {
    let x_min_t = (rect.x_min + thickness).min(w - 1);
    let y_min_t = (rect.y_min + thickness).min(h - 1);
    let x_max_t = (rect.x_max - thickness).max(0);
    let y_max_t = (rect.y_max - thickness).max(0);

    for x in x_min_t..=x_max_t {
      if y_min_t >= 0 && (y_min_t as u32) < image.height() && (x as u32) < image.width() {
        *image.get_pixel_mut(x as u32, y_min_t as u32) = Rgb(color);
      }
      if y_max_t >= 0 && (y_max_t as u32) < image.height() && (x as u32) < image.width() {
        *image.get_pixel_mut(x as u32, y_max_t as u32) = Rgb(color);
      }
    }

    for y in y_min_t..=y_max_t {
      if x_min_t >= 0 && (x_min_t as u32) < image.width() && (y as u32) < image.height() {
        *image.get_pixel_mut(x_min_t as u32, y as u32) = Rgb(color);
      }
      if x_max_t >= 0 && (x_max_t as u32) < image.width() && (y as u32) < image.height() {
        *image.get_pixel_mut(x_max_t as u32, y as u32) = Rgb(color);
      }
    }
  }
}

/// 以文本形式记录检测结果
pub struct Record {
  pub label_with_name: bool,
}

impl Record {
  pub fn record(
    &self,
    labels: &LabelMap,
    result: &DetectResult,
    path: &Path,
  ) -> Result<(), std::io::Error> {
    let mut records = Vec::new();
    for item in result.items.iter() {
      let name = if self.label_with_name {
        labels.name(item.class_id)
      } else {
        format!("{}", item.class_id)
      };
      let record = format!(
        "{}, {:.4}, {:.4}, {:.4}, {:.4}, {:.4}",
        name, item.score, item.bbox[0], item.bbox[1], item.bbox[2], item.bbox[3]
      );
      records.push(record);
    }
    std::fs::write(path.with_extension("txt"), records.join("\n"))?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn border_pixels_are_painted() {
    let mut image = RgbImage::from_pixel(32, 32, Rgb([0, 0, 0]));
    let rect = PixelRect {
      x_min: 4,
      y_min: 4,
      x_max: 20,
      y_max: 20,
    };

    draw_box_border(&mut image, rect, [0, 0, 255]);

    assert_eq!(image.get_pixel(4, 4).0, [0, 0, 255]);
    assert_eq!(image.get_pixel(20, 20).0, [0, 0, 255]);
    assert_eq!(image.get_pixel(12, 12).0, [0, 0, 0]);
    // 第二圈加粗
    assert_eq!(image.get_pixel(5, 12).0, [0, 0, 255]);
  }

  #[test]
  fn record_lists_one_line_per_detection() {
    let labels = LabelMap::from_labels(vec!["person".into(), "cat".into()]);
    let result = DetectResult {
      items: vec![
        DetectItem {
          class_id: 1,
          score: 0.75,
          bbox: [0.1, 0.2, 0.3, 0.4],
        },
        DetectItem {
          class_id: 0,
          score: 0.5,
          bbox: [0.0, 0.0, 1.0, 1.0],
        },
      ]
      .into_boxed_slice(),
    };

    let path = std::env::temp_dir().join(format!("wangjian-record-{}.png", std::process::id()));
    Record {
      label_with_name: true,
    }
    .record(&labels, &result, &path)
    .unwrap();

    let text = std::fs::read_to_string(path.with_extension("txt")).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("cat, 0.7500"));
    let _ = std::fs::remove_file(path.with_extension("txt"));
  }
}
