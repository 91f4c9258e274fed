// 该文件是 Wangjian （望见） 项目的一部分。
// src/bin/simple_oneshot.rs - 单次检测命令行
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

use anyhow::Result;
use clap::Parser;
use tracing::info;
use url::Url;

use wangjian::{
  FromUrl,
  input::InputWrapper,
  model::{LabelMap, SsdBuilder},
  output::{OutputTarget, draw::Draw},
  task::{BatchTask, OneShotTask, Task},
};

const INPUT_WIDTH: u32 = 320;
const INPUT_HEIGHT: u32 = 320;

/// Wangjian 项目参数配置
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
  /// SSD 模型文件路径 (ssd:path)
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入来源 (image:path 或 folder:dir)
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径 (image:path 或 folder:dir[?record=...])
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
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

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型文件路径: {}", args.model);
  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let labels = LabelMap::load(&args.labels)?;
  let draw = Draw::load(&args.font, labels)?;

  let input = InputWrapper::from_url(&args.input)?;
  let model = SsdBuilder::from_url(&args.model)?
    .threads(args.threads)
    .build::<INPUT_WIDTH, INPUT_HEIGHT>()?;
  let output = OutputTarget::from_url(&args.output)?.into_output(draw);

  // 单图输入只处理一帧，目录输入遍历全部图片
  match input {
    input @ InputWrapper::Image(_) => {
      let frames = input.into_frames::<INPUT_WIDTH, INPUT_HEIGHT>(!args.stretch);
      OneShotTask.run_task(frames, model, output)?;
    }
    input @ InputWrapper::Folder(_) => {
      let frames = input.into_frames::<INPUT_WIDTH, INPUT_HEIGHT>(!args.stretch);
      BatchTask.run_task(frames, model, output)?;
    }
  }

  Ok(())
}
