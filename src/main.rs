// 该文件是 Wangjian （望见） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use image::ImageReader;
use tracing::info;

use wangjian::catalog::Catalog;
use wangjian::frame::DetectFrame;
use wangjian::model::{DetectResult, LabelMap, Model, Ssd, SsdBuilder};
use wangjian::output::draw::Draw;
use wangjian::output::{DirectoryOutput, Render};

/// 模型输入尺寸。SSD 量化模型固定接收 320x320 的输入。
const INPUT_WIDTH: u32 = 320;
const INPUT_HEIGHT: u32 = 320;

type Detector = Ssd<INPUT_WIDTH, INPUT_HEIGHT>;

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();
  let args = args::Args::parse();

  println!("Wangjian 检测查看器");
  println!("==================");
  println!("模型目录: {}", args.model_dir.display());
  println!("图片目录: {}", args.image_dir.display());
  println!("输出目录: {}", args.output.display());
  println!();

  let labels = LabelMap::load(&args.labels)
    .with_context(|| format!("无法加载标签文件: {}", args.labels.display()))?;
  let draw = Draw::load(&args.font, labels.clone())
    .with_context(|| format!("无法加载字体文件: {}", args.font.display()))?;

  let mut catalog = Catalog::scan(&args.model_dir, &args.image_dir).context("扫描目录失败")?;
  if catalog.models().is_empty() {
    anyhow::bail!("在 {} 下没有找到模型文件 (*.onnx)", args.model_dir.display());
  }
  if catalog.image_count() == 0 {
    anyhow::bail!("在 {} 下没有找到图片 (*.jpg)", args.image_dir.display());
  }

  let models: Vec<PathBuf> = catalog.models().to_vec();
  let output = DirectoryOutput::new(&args.output, draw);

  print_models(&models, 0);
  println!();
  println!("命令: models | model <N> | process | next | quit");

  let mut selected = 0usize;
  let mut detector: Option<(usize, Detector)> = None;

  let stdin = io::stdin();
  loop {
    print!("> ");
    io::stdout().flush()?;

    let mut line = String::new();
    if stdin.lock().read_line(&mut line)? == 0 {
      // 标准输入已关闭
      break;
    }
    let line = line.trim();

    match line {
      "" => continue,
      "quit" | "q" => break,
      "models" => print_models(&models, selected),
      "process" => {
        let image = match catalog.image() {
          Some(path) => path.to_path_buf(),
          None => continue,
        };
        run_once(
          &image,
          &models,
          selected,
          &mut detector,
          &output,
          &labels,
          &args,
        );
      }
      "next" => {
        let image = match catalog.next_image() {
          Some(path) => path.to_path_buf(),
          None => continue,
        };
        run_once(
          &image,
          &models,
          selected,
          &mut detector,
          &output,
          &labels,
          &args,
        );
      }
      other => {
        if let Some(num) = other.strip_prefix("model ") {
          match num.trim().parse::<usize>() {
            Ok(n) if (1..=models.len()).contains(&n) => {
              selected = n - 1;
              println!("已选择模型: {}", models[selected].display());
            }
            _ => println!("无效的模型编号: {} (可用范围 1-{})", num.trim(), models.len()),
          }
        } else {
          println!("未知命令: {}", other);
        }
      }
    }
  }

  println!("再见!");
  Ok(())
}

/// 打印模型列表，当前选中的模型以 `*` 标记。
fn print_models(models: &[PathBuf], selected: usize) {
  println!("可用模型:");
  for (ix, path) in models.iter().enumerate() {
    let marker = if ix == selected { "*" } else { " " };
    println!("  {} {}) {}", marker, ix + 1, path.display());
  }
}

/// 处理当前图片并打印检测结果。处理失败不退出命令循环。
fn run_once(
  image_path: &Path,
  models: &[PathBuf],
  selected: usize,
  detector: &mut Option<(usize, Detector)>,
  output: &DirectoryOutput,
  labels: &LabelMap,
  args: &args::Args,
) {
  match process_image(image_path, models, selected, detector, output, args) {
    Ok(result) => print_detections(image_path, labels, &result),
    Err(e) => eprintln!("处理失败: {:#}", e),
  }
}

fn process_image(
  image_path: &Path,
  models: &[PathBuf],
  selected: usize,
  detector: &mut Option<(usize, Detector)>,
  output: &DirectoryOutput,
  args: &args::Args,
) -> Result<DetectResult> {
  // 模型切换后在首次处理时才重新加载
  let ssd: &mut Detector = match detector {
    Some((ix, ssd)) if *ix == selected => ssd,
    other => {
      info!("加载模型: {}", models[selected].display());
      let ssd = SsdBuilder::new(&models[selected])
        .threads(args.threads)
        .build::<INPUT_WIDTH, INPUT_HEIGHT>()?;
      &mut other.insert((selected, ssd)).1
    }
  };

  let image = ImageReader::open(image_path)
    .with_context(|| format!("打开图片失败: {}", image_path.display()))?
    .decode()
    .with_context(|| format!("解码图片失败: {}", image_path.display()))?;
  let frame = DetectFrame::<INPUT_WIDTH, INPUT_HEIGHT>::from_image(image.into(), !args.stretch);

  let start = std::time::Instant::now();
  let result = ssd.infer(&frame)?;
  info!("推理耗时: {:?}", start.elapsed());

  output.render_result(&frame, &result)?;
  Ok(result)
}

fn print_detections(image_path: &Path, labels: &LabelMap, result: &DetectResult) {
  println!("{}: 检测到 {} 个对象", image_path.display(), result.len());
  for item in result.items.iter() {
    println!(
      "  - {}: {:.1}%  [{:.3}, {:.3}, {:.3}, {:.3}]",
      labels.name(item.class_id),
      item.score * 100.0,
      item.bbox[0],
      item.bbox[1],
      item.bbox[2],
      item.bbox[3],
    );
  }
}
