use crate::error::{DagForgeError, DfResult};
use crate::model::NodeKind;
use clap::Args;
use std::str::FromStr;

#[derive(Args, Debug, Clone)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub constraints: ConstraintParams,
}

#[derive(Args, Debug, Clone)]
pub struct SearchParams {
    #[arg(long, default_value_t = 500)]
    pub max_iters: usize,
    #[arg(long, default_value_t = 0.0)]
    pub epsilon: f64,
    #[arg(long, default_value_t = 5)]
    pub patience: usize,
    /// 0 means unbounded.
    #[arg(long, default_value_t = 0)]
    pub max_indegree: usize,
    #[arg(long, default_value_t = 0.2)]
    pub holdout_ratio: f64,
}

#[derive(Args, Debug, Clone)]
pub struct ConstraintParams {
    /// Forbidden arcs, e.g. "a->b,c->d".
    #[arg(long, default_value = "")]
    pub blacklist: String,
    /// Forced arcs, same syntax as --blacklist.
    #[arg(long, default_value = "")]
    pub whitelist: String,
    /// Pinned node families, e.g. "a:kde,b:linear_gaussian".
    #[arg(long, default_value = "")]
    pub kind_whitelist: String,
}

impl ConstraintParams {
    pub fn get_blacklist(&self) -> DfResult<Vec<(String, String)>> {
        parse_arc_list(&self.blacklist, "blacklist")
    }

    pub fn get_whitelist(&self) -> DfResult<Vec<(String, String)>> {
        parse_arc_list(&self.whitelist, "whitelist")
    }

    pub fn get_kind_whitelist(&self) -> DfResult<Vec<(String, NodeKind)>> {
        if self.kind_whitelist.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.kind_whitelist
            .split(',')
            .map(|entry| {
                let (node, kind) = entry.trim().split_once(':').ok_or_else(|| {
                    DagForgeError::Config(format!(
                        "Kind whitelist entry '{}' is not 'node:family'",
                        entry
                    ))
                })?;
                let kind = NodeKind::from_str(kind.trim()).map_err(|_| {
                    DagForgeError::Config(format!("Unknown distribution family '{}'", kind))
                })?;
                Ok((node.trim().to_string(), kind))
            })
            .collect()
    }
}

fn parse_arc_list(raw: &str, name: &str) -> DfResult<Vec<(String, String)>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|entry| {
            let (s, t) = entry.trim().split_once("->").ok_or_else(|| {
                DagForgeError::Config(format!(
                    "--{} entry '{}' is not 'source->target'",
                    name, entry
                ))
            })?;
            Ok((s.trim().to_string(), t.trim().to_string()))
        })
        .collect()
}
