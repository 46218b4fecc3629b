//! 配置校验模块
//!
//! 校验规则：
//! - 字段范围 (validator derive): gain ∈ (0, 1]、fps > 0、timeout > 0、opacity ∈ [0, 1]
//! - min_interval_ms <= max_interval_ms
//! - default_interval_ms 位于 [min, max] 内
//! - topology 关键点名小写且唯一，边的端点均已声明

use std::collections::HashSet;

use contracts::{ContractError, OverlayConfig};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// 校验 OverlayConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &OverlayConfig) -> Result<(), ContractError> {
    validate_fields(config)?;
    validate_timing(config)?;
    validate_topology(config)?;
    Ok(())
}

/// 字段级校验，取字典序第一个错误
fn validate_fields(config: &OverlayConfig) -> Result<(), ContractError> {
    match config.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let (field, message) = first_error(&errors, "")
                .unwrap_or_else(|| ("<config>".to_string(), "invalid value".to_string()));
            Err(ContractError::config_validation(field, message))
        }
    }
}

fn first_error(errors: &ValidationErrors, prefix: &str) -> Option<(String, String)> {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (name, kind) in fields {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(error) = list.first() {
                    let message = match (&error.message, error.params.get("value")) {
                        (Some(message), _) => message.to_string(),
                        (None, Some(value)) => format!("{} check failed, got {value}", error.code),
                        (None, None) => format!("{} check failed", error.code),
                    };
                    return Some((path, message));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                if let Some(found) = first_error(nested, &path) {
                    return Some(found);
                }
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    if let Some(found) = first_error(nested, &format!("{path}[{index}]")) {
                        return Some(found);
                    }
                }
            }
        }
    }
    None
}

/// 校验时间模型区间
fn validate_timing(config: &OverlayConfig) -> Result<(), ContractError> {
    let timing = &config.timing;

    if timing.min_interval_ms > timing.max_interval_ms {
        return Err(ContractError::config_validation(
            "timing.min_interval_ms / timing.max_interval_ms",
            format!(
                "min_interval_ms ({}) must be <= max_interval_ms ({})",
                timing.min_interval_ms, timing.max_interval_ms
            ),
        ));
    }

    if !(timing.min_interval_ms..=timing.max_interval_ms).contains(&timing.default_interval_ms) {
        return Err(ContractError::config_validation(
            "timing.default_interval_ms",
            format!(
                "default_interval_ms ({}) must lie within [{}, {}]",
                timing.default_interval_ms, timing.min_interval_ms, timing.max_interval_ms
            ),
        ));
    }

    Ok(())
}

/// 校验骨架拓扑
fn validate_topology(config: &OverlayConfig) -> Result<(), ContractError> {
    let topology = &config.topology;

    let mut seen = HashSet::new();
    for (idx, name) in topology.keypoints.iter().enumerate() {
        if name.is_empty() || *name != name.to_lowercase() {
            return Err(ContractError::config_validation(
                format!("topology.keypoints[{idx}]"),
                format!("keypoint name '{name}' must be non-empty lower-case"),
            ));
        }
        if !seen.insert(name.as_str()) {
            return Err(ContractError::config_validation(
                format!("topology.keypoints[{idx}]"),
                format!("duplicate keypoint '{name}'"),
            ));
        }
    }

    if let Some((a, b)) = topology.dangling_edges().next() {
        let missing = if topology.declares(a) { b } else { a };
        return Err(ContractError::config_validation(
            format!("topology.edges[{a}-{b}]"),
            format!("edge endpoint '{missing}' is not a declared keypoint"),
        ));
    }

    Ok(())
}
