// 该文件是 Wangjian （望见） 项目的一部分。
// src/frame.rs - 帧定义与信箱式预处理
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

use fast_image_resize::{
  FilterType, ResizeAlg, ResizeOptions, Resizer,
  images::{CroppedImageMut, Image as FirImage},
  pixels::PixelType,
};
use image::RgbImage;
use ndarray::Array4;

const RGB_CHANNELS: usize = 3;

/// 信箱填充色（灰）
const LETTERBOX_FILL: u8 = 190;

/// 纵横比差异小于该值时直接拉伸，不做信箱填充
const RATIO_EPS: f64 = 0.1;

/// 归一化的 NHWC 浮点输入张量
#[derive(Debug, Clone)]
pub struct RgbNhwcFrame<const W: u32, const H: u32> {
  data: Box<[f32]>,
}

impl<const W: u32, const H: u32> From<Vec<f32>> for RgbNhwcFrame<W, H> {
  fn from(data: Vec<f32>) -> Self {
    if data.len() != (RGB_CHANNELS * W as usize * H as usize) {
      panic!(
        "数据长度不匹配: 期望长度 {}, 实际长度 {}",
        RGB_CHANNELS * W as usize * H as usize,
        data.len()
      );
    }

    Self {
      data: data.into_boxed_slice(),
    }
  }
}

impl<const W: u32, const H: u32> Default for RgbNhwcFrame<W, H> {
  fn default() -> Self {
    let size = RGB_CHANNELS * (W as usize) * (H as usize);
    let data = vec![0f32; size].into_boxed_slice();
    Self { data }
  }
}

impl<const W: u32, const H: u32> RgbNhwcFrame<W, H> {
  pub fn height(&self) -> usize {
    H as usize
  }

  pub fn width(&self) -> usize {
    W as usize
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }

  pub fn as_nhwc(&self) -> &[f32] {
    &self.data
  }

  /// 转为形状 [1, H, W, 3] 的批张量
  pub fn to_array(&self) -> Array4<f32> {
    Array4::from_shape_vec((1, H as usize, W as usize, RGB_CHANNELS), self.data.to_vec())
      .expect("张量形状不匹配")
  }
}

/// 一次检测周期内的全部图像缓冲：
/// 原始图像、缩放到模型输入分辨率的图像，以及是否经过信箱填充。
#[derive(Debug, Clone)]
pub struct DetectFrame<const W: u32, const H: u32> {
  original: RgbImage,
  resized: RgbImage,
  ratio_preserved: bool,
}

impl<const W: u32, const H: u32> DetectFrame<W, H> {
  /// 将原始图像缩放到 W x H 的模型输入。
  ///
  /// 当要求保持纵横比且纵横比差异超过阈值时，按受限轴统一缩放，
  /// 粘贴到左上角并以灰色填充剩余区域；否则直接拉伸。
  pub fn from_image(original: RgbImage, preserve_ratio: bool) -> Self {
    let (orig_w, orig_h) = original.dimensions();
    let orig_ratio = orig_w as f64 / orig_h as f64;
    let input_ratio = W as f64 / H as f64;

    let src = FirImage::from_vec_u8(orig_w, orig_h, original.as_raw().clone(), PixelType::U8x3)
      .expect("源图像缓冲长度不匹配");
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    let mut resizer = Resizer::new();

    let letterboxed = preserve_ratio && (orig_ratio - input_ratio).abs() > RATIO_EPS;

    let resized = if letterboxed {
      // 受限轴占满模型输入，另一轴至少保留 1 像素
      let (new_w, new_h) = if input_ratio <= orig_ratio {
        (W, ((W as f64 / orig_ratio) as u32).max(1))
      } else {
        (((H as f64 * orig_ratio) as u32).max(1), H)
      };

      let mut padded = FirImage::from_vec_u8(
        W,
        H,
        vec![LETTERBOX_FILL; RGB_CHANNELS * (W as usize) * (H as usize)],
        PixelType::U8x3,
      )
      .expect("信箱画布缓冲长度不匹配");

      {
        let mut roi = CroppedImageMut::new(&mut padded, 0, 0, new_w, new_h).expect("信箱区域越界");
        resizer.resize(&src, &mut roi, &options).expect("图像缩放失败");
      }

      RgbImage::from_raw(W, H, padded.buffer().to_vec()).expect("信箱画布缓冲长度不匹配")
    } else {
      let mut dst = FirImage::new(W, H, PixelType::U8x3);
      resizer.resize(&src, &mut dst, &options).expect("图像缩放失败");
      RgbImage::from_raw(W, H, dst.buffer().to_vec()).expect("缩放缓冲长度不匹配")
    };

    DetectFrame {
      original,
      resized,
      ratio_preserved: letterboxed,
    }
  }

  pub fn original(&self) -> &RgbImage {
    &self.original
  }

  pub fn resized(&self) -> &RgbImage {
    &self.resized
  }

  pub fn ratio_preserved(&self) -> bool {
    self.ratio_preserved
  }

  pub fn input_width(&self) -> u32 {
    W
  }

  pub fn input_height(&self) -> u32 {
    H
  }

  /// 归一化 (RGB / 255) 的模型输入张量
  pub fn tensor(&self) -> RgbNhwcFrame<W, H> {
    let data: Vec<f32> = self
      .resized
      .as_raw()
      .iter()
      .map(|&v| v as f32 / 255.0)
      .collect();
    RgbNhwcFrame::from(data)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgb;

  fn solid(w: u32, h: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(w, h, Rgb(color))
  }

  #[test]
  fn wide_image_letterboxed_with_bottom_fill() {
    let frame = DetectFrame::<100, 100>::from_image(solid(200, 100, [255, 0, 0]), true);

    assert!(frame.ratio_preserved());
    assert_eq!(frame.resized().dimensions(), (100, 100));
    // 上半部分是内容，下半部分是灰色填充
    assert_eq!(frame.resized().get_pixel(0, 0).0, [255, 0, 0]);
    assert_eq!(
      frame.resized().get_pixel(0, 99).0,
      [LETTERBOX_FILL, LETTERBOX_FILL, LETTERBOX_FILL]
    );
  }

  #[test]
  fn tall_image_letterboxed_with_right_fill() {
    let frame = DetectFrame::<100, 100>::from_image(solid(100, 200, [0, 255, 0]), true);

    assert!(frame.ratio_preserved());
    assert_eq!(frame.resized().get_pixel(0, 0).0, [0, 255, 0]);
    assert_eq!(
      frame.resized().get_pixel(99, 0).0,
      [LETTERBOX_FILL, LETTERBOX_FILL, LETTERBOX_FILL]
    );
  }

  #[test]
  fn stretch_mode_fills_whole_canvas() {
    let frame = DetectFrame::<100, 100>::from_image(solid(200, 100, [255, 0, 0]), false);

    assert!(!frame.ratio_preserved());
    assert_eq!(frame.resized().get_pixel(0, 99).0, [255, 0, 0]);
  }

  #[test]
  fn near_square_ratio_skips_letterbox() {
    // 纵横比差异在阈值内，即使要求保持纵横比也直接拉伸
    let frame = DetectFrame::<100, 100>::from_image(solid(105, 100, [0, 0, 255]), true);
    assert!(!frame.ratio_preserved());
  }

  #[test]
  fn tensor_is_normalized_nhwc() {
    let frame = DetectFrame::<4, 4>::from_image(solid(4, 4, [255, 0, 0]), false);
    let tensor = frame.tensor();

    assert_eq!(tensor.as_nhwc().len(), 4 * 4 * 3);
    assert_eq!(tensor.as_nhwc()[0], 1.0);
    assert_eq!(tensor.as_nhwc()[1], 0.0);

    let batch = tensor.to_array();
    assert_eq!(batch.shape(), &[1, 4, 4, 3]);
  }

  #[test]
  #[should_panic(expected = "数据长度不匹配")]
  fn frame_rejects_wrong_buffer_length() {
    let _ = RgbNhwcFrame::<4, 4>::from(vec![0f32; 7]);
  }
}
