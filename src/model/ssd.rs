// 该文件是 Wangjian （望见） 项目的一部分。
// src/model/ssd.rs - SSD 检测模型
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

use ort::{
  execution_providers::{CPUExecutionProvider, ExecutionProvider},
  session::{Session, SessionInputValue, builder::GraphOptimizationLevel},
  value::Value,
};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{
  FromUrl,
  frame::DetectFrame,
  model::{DetectItem, DetectResult, Model},
};

const SSD_NUM_INPUTS: usize = 1;
const SSD_NUM_OUTPUTS: usize = 4;
const SSD_MAX_DETECTIONS: usize = 100;
const SSD_SCORE_THRESH: f32 = 0.4;
const SSD_DEFAULT_THREADS: usize = 4;

/// 固定的输出张量顺序：框、类别、置信度、有效数量
const SSD_OUTPUT_BOXES: usize = 0;
const SSD_OUTPUT_CLASSES: usize = 1;
const SSD_OUTPUT_SCORES: usize = 2;
const SSD_OUTPUT_COUNT: usize = 3;

pub struct Ssd<const W: u32, const H: u32> {
  session: Session,
  output_names: Vec<String>,
}

#[derive(Error, Debug)]
pub enum SsdError {
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
  #[error("模型无效: {0}")]
  ModelInvalid(String),
  #[error("ONNX Runtime 错误: {0}")]
  OrtError(#[from] ort::Error),
  #[error("读取输出张量 {0} 失败: {1}")]
  OutputTensor(String, ort::Error),
}

pub struct SsdBuilder {
  model_path: PathBuf,
  threads: usize,
}

const SSD_SCHEME: &str = "ssd";

impl FromUrl for SsdBuilder {
  type Error = SsdError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != SSD_SCHEME {
      return Err(SsdError::ModelPathError(format!(
        "模型路径必须使用 {} 方案",
        SSD_SCHEME
      )));
    }

    Ok(SsdBuilder::new(url.path()))
  }
}

impl SsdBuilder {
  pub fn new(model_path: impl AsRef<Path>) -> Self {
    SsdBuilder {
      model_path: model_path.as_ref().to_path_buf(),
      threads: SSD_DEFAULT_THREADS,
    }
  }

  /// CPU 推理的算子内线程数
  pub fn threads(mut self, threads: usize) -> Self {
    self.threads = threads;
    self
  }

  pub fn build<const W: u32, const H: u32>(self) -> Result<Ssd<W, H>, SsdError> {
    info!("加载模型文件: {}", self.model_path.display());

    let mut builder = Session::builder()?;

    let cpu = CPUExecutionProvider::default();
    if cpu.is_available()? {
      cpu.register(&mut builder).map_err(ort::Error::from)?;
    } else {
      return Err(SsdError::ModelInvalid("CPU 执行提供者不可用".to_string()));
    }

    info!("创建 ONNX Runtime 推理会话, 线程数: {}", self.threads);
    let session = builder
      .with_optimization_level(GraphOptimizationLevel::Level3)?
      .with_intra_threads(self.threads)?
      .commit_from_file(&self.model_path)?;
    info!("模型加载完成");

    let num_inputs = session.inputs.len();
    let num_outputs = session.outputs.len();

    if num_inputs != SSD_NUM_INPUTS {
      return Err(SsdError::ModelInvalid(format!(
        "预期模型输入数量为 {}, 实际为 {}",
        SSD_NUM_INPUTS, num_inputs
      )));
    }

    if num_outputs != SSD_NUM_OUTPUTS {
      return Err(SsdError::ModelInvalid(format!(
        "预期模型输出数量为 {}, 实际为 {}",
        SSD_NUM_OUTPUTS, num_outputs
      )));
    }

    let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();

    debug!("模型输入数量: {}", num_inputs);
    debug!("模型输出张量: {:?}", output_names);

    Ok(Ssd {
      session,
      output_names,
    })
  }
}

impl<const W: u32, const H: u32> Model for Ssd<W, H> {
  type Input = DetectFrame<W, H>;
  type Output = DetectResult;
  type Error = SsdError;

  fn infer(&mut self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    debug!("设置模型输入");
    let batch = input.tensor().to_array();
    let value = Value::from_array(batch)?;
    let inputs = [SessionInputValue::from(value.into_dyn())];

    debug!("执行模型推理");
    let outputs = self.session.run(&inputs[..])?;

    debug!("获取模型输出");
    let mut tensors = Vec::with_capacity(SSD_NUM_OUTPUTS);
    for name in &self.output_names {
      let view = outputs[name.as_str()]
        .try_extract_array::<f32>()
        .map_err(|e| SsdError::OutputTensor(name.clone(), e))?;
      tensors.push(view.iter().copied().collect::<Vec<f32>>());
    }

    let count = tensors[SSD_OUTPUT_COUNT]
      .first()
      .map(|&c| c.max(0.0) as usize)
      .unwrap_or(0);
    debug!("模型报告 {} 个有效检测", count);

    Ok(postprocess(
      &tensors[SSD_OUTPUT_BOXES],
      &tensors[SSD_OUTPUT_CLASSES],
      &tensors[SSD_OUTPUT_SCORES],
      count,
    ))
  }
}

/// SSD 后处理：并行数组 -> 检测结果。
///
/// 框坐标按 (top, left, bottom, right) 归一化排列，
/// 重排为 [x_min, y_min, x_max, y_max] 并钳制到 [0, 1]；
/// 置信度不严格高于阈值的检测会被丢弃。
pub fn postprocess(boxes: &[f32], classes: &[f32], scores: &[f32], count: usize) -> DetectResult {
  let bound = count
    .min(SSD_MAX_DETECTIONS)
    .min(scores.len())
    .min(classes.len())
    .min(boxes.len() / 4);

  let mut items = Vec::new();

  for i in 0..bound {
    let score = scores[i];
    if score <= SSD_SCORE_THRESH {
      continue;
    }

    let pos = i * 4;
    let top = boxes[pos].clamp(0.0, 1.0);
    let left = boxes[pos + 1].clamp(0.0, 1.0);
    let bottom = boxes[pos + 2].clamp(0.0, 1.0);
    let right = boxes[pos + 3].clamp(0.0, 1.0);

    items.push(DetectItem {
      class_id: classes[i].max(0.0) as u32,
      score,
      bbox: [left, top, right, bottom],
    });
  }

  debug!("检测到 {} 个物体", items.len());

  DetectResult {
    items: items.into_boxed_slice(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn threshold_is_strict_at_boundary() {
    let boxes = [0.1f32, 0.1, 0.9, 0.9, 0.2, 0.2, 0.8, 0.8];
    let classes = [0.0f32, 1.0];
    let scores = [0.4f32, 0.41];

    let result = postprocess(&boxes, &classes, &scores, 2);

    // 恰好 0.4 被排除，0.41 保留
    assert_eq!(result.len(), 1);
    assert_eq!(result.items[0].class_id, 1);
  }

  #[test]
  fn bbox_reordered_from_tlbr_to_xyxy() {
    let boxes = [0.1f32, 0.2, 0.3, 0.4]; // (top, left, bottom, right)
    let result = postprocess(&boxes, &[7.0], &[0.9], 1);

    assert_eq!(result.items[0].bbox, [0.2, 0.1, 0.4, 0.3]);
    assert_eq!(result.items[0].class_id, 7);
  }

  #[test]
  fn count_bounds_iteration() {
    let boxes = [0.0f32; 8];
    let classes = [0.0f32, 0.0];
    let scores = [0.9f32, 0.9];

    assert_eq!(postprocess(&boxes, &classes, &scores, 1).len(), 1);
    // 报告的数量超出数组长度时以数组为准
    assert_eq!(postprocess(&boxes, &classes, &scores, 500).len(), 2);
    assert_eq!(postprocess(&boxes, &classes, &scores, 0).len(), 0);
  }

  #[test]
  fn bbox_is_clamped_to_unit_range() {
    let boxes = [-0.5f32, -0.5, 1.5, 1.5];
    let result = postprocess(&boxes, &[0.0], &[0.9], 1);
    assert_eq!(result.items[0].bbox, [0.0, 0.0, 1.0, 1.0]);
  }
}
