//! # picker-probe
//!
//! 离线诊断工具：读取 JSON 请求数组，输出每个请求的识别结果与改写结果。
//!
//! ```text
//! PICKER_CONFIG=config/picker.toml picker-probe requests.json
//! ```

use std::fs;

use anyhow::{Context, Result};
use no_photo_picker::tracing::init_tracing_from_config;
use no_photo_picker::{ClassificationRule, Request, RequestClassifier, RequestRewriter, load_config};
use serde::Serialize;

/// 单个请求的诊断结果
#[derive(Debug, Serialize)]
struct ProbeReport {
    index: usize,
    action: Option<String>,
    matched_rule: Option<ClassificationRule>,
    rewritten: Option<Request>,
}

fn main() -> Result<()> {
    let config_path = std::env::var("PICKER_CONFIG").ok();
    let config = load_config(config_path.as_deref());
    init_tracing_from_config(Some(&config.logging));

    let input = std::env::args()
        .nth(1)
        .context("usage: picker-probe <requests.json>")?;
    let raw = fs::read_to_string(&input).with_context(|| format!("unable to read {input}"))?;
    let requests: Vec<Request> =
        serde_json::from_str(&raw).with_context(|| format!("invalid request list in {input}"))?;

    let classifier = RequestClassifier::from_config(&config.classifier);
    let rewriter = RequestRewriter::new(config.platform());

    let reports: Vec<ProbeReport> = requests
        .iter()
        .enumerate()
        .map(|(index, request)| {
            let matched_rule = classifier.matching_rule(request).cloned();
            let rewritten = matched_rule.as_ref().map(|_| rewriter.rewrite(request));
            ProbeReport {
                index,
                action: request.action.clone(),
                matched_rule,
                rewritten,
            }
        })
        .collect();

    tracing::info!(
        total = reports.len(),
        matched = reports.iter().filter(|r| r.matched_rule.is_some()).count(),
        "probe finished"
    );
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
