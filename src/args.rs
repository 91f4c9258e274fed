// 该文件是 Wangjian （望见） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::Parser;

/// Wangjian 项目参数配置
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
  /// 模型扫描目录（其中的 *.onnx 作为可选模型）
  #[arg(long, default_value = ".", value_name = "DIR")]
  pub model_dir: PathBuf,

  /// 图片目录（其中的 *.jpg 作为可轮换图片）
  #[arg(long, default_value = "images", value_name = "DIR")]
  pub image_dir: PathBuf,

  /// 标注结果输出目录（每次处理覆盖 resized.jpg 与 original.jpg）
  #[arg(long, default_value = "out", value_name = "DIR")]
  pub output: PathBuf,

  /// 类别标签文件（每行一个标签）
  #[arg(long, default_value = "labelmap.txt", value_name = "FILE")]
  pub labels: PathBuf,

  /// 标签字体文件
  #[arg(long, default_value = "font.ttf", value_name = "FILE")]
  pub font: PathBuf,

  /// CPU 推理线程数
  #[arg(long, default_value = "4", value_name = "COUNT")]
  pub threads: usize,

  /// 直接拉伸到模型输入尺寸，不保持纵横比
  #[arg(long)]
  pub stretch: bool,
}
